use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{LayoutType, MemberRef, OrgNodeRecord};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "orgchart=trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Member fixture with a derived name.
pub fn member(id: &str, position: &str) -> MemberRef {
    MemberRef {
        id: id.to_string(),
        name: format!("Member {id}"),
        position: position.to_string(),
        image_url: None,
    }
}

/// Records A, B (standard), C and D (staff) under root A.
pub fn principal_with_staff() -> Vec<OrgNodeRecord> {
    vec![
        OrgNodeRecord::new("A", None, 0),
        OrgNodeRecord::new("B", Some("A"), 1).with_layout(LayoutType::Standard),
        OrgNodeRecord::new("C", Some("A"), 0).with_layout(LayoutType::StaffRight),
        OrgNodeRecord::new("D", Some("A"), 2).with_layout(LayoutType::StaffRight),
    ]
}
