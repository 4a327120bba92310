//! Tests for lane classification and the layout tree

use rstest::rstest;

use orgchart::domain::{
    build_forest, classify, lay_out, walk_forest, CardKind, Geometry, LayoutType, LineType,
    OrgNodeRecord,
};
use orgchart::util::testing::{init_test_setup, member, principal_with_staff};

fn child_ids<'a>(nodes: &[&'a orgchart::domain::OrgNode]) -> Vec<&'a str> {
    nodes.iter().map(|n| n.id.as_str()).collect()
}

// ============================================================
// classify
// ============================================================

#[test]
fn given_principal_with_staff_when_classifying_then_lanes_split_in_order() {
    // Arrange
    init_test_setup();
    let forest = build_forest(&principal_with_staff(), &[]).unwrap();

    // Act
    let lanes = classify(&forest[0]);

    // Assert
    assert_eq!(child_ids(&lanes.standard), vec!["B"]);
    assert_eq!(child_ids(&lanes.staff), vec!["C", "D"]);
    assert!(lanes.has_staff());
}

#[test]
fn given_leaf_when_classifying_then_both_lanes_empty() {
    let forest = build_forest(&[OrgNodeRecord::new("solo", None, 0)], &[]).unwrap();

    let lanes = classify(&forest[0]);

    assert!(lanes.standard.is_empty());
    assert!(!lanes.has_staff());
}

#[rstest]
#[case(vec![])]
#[case(vec![LayoutType::Standard, LayoutType::Standard])]
#[case(vec![LayoutType::StaffRight, LayoutType::StaffRight, LayoutType::StaffRight])]
#[case(vec![
    LayoutType::StaffRight,
    LayoutType::Standard,
    LayoutType::StaffRight,
    LayoutType::Standard,
    LayoutType::Standard,
])]
fn given_mixed_children_when_classifying_then_lanes_partition_children(
    #[case] layouts: Vec<LayoutType>,
) {
    // Arrange
    let mut records = vec![OrgNodeRecord::new("p", None, 0)];
    for (i, layout) in layouts.iter().enumerate() {
        records.push(OrgNodeRecord::new(format!("c{i}"), Some("p"), i as i64).with_layout(*layout));
    }
    let forest = build_forest(&records, &[]).unwrap();
    let parent = &forest[0];

    // Act
    let lanes = classify(parent);

    // Assert
    assert_eq!(lanes.standard.len() + lanes.staff.len(), parent.children.len());
    assert!(lanes.standard.iter().all(|n| n.layout_type == LayoutType::Standard));
    assert!(lanes.staff.iter().all(|n| n.layout_type == LayoutType::StaffRight));
    // relative order within each lane follows children order
    let positions = |lane: &[&orgchart::domain::OrgNode]| -> Vec<usize> {
        lane.iter()
            .map(|n| parent.children.iter().position(|c| c.id == n.id).unwrap())
            .collect()
    };
    let standard = positions(&lanes.standard[..]);
    let staff = positions(&lanes.staff[..]);
    assert!(standard.windows(2).all(|w| w[0] < w[1]));
    assert!(staff.windows(2).all(|w| w[0] < w[1]));
}

// ============================================================
// lay_out
// ============================================================

#[test]
fn given_principal_with_staff_when_laying_out_then_reservation_and_offset_set() {
    // Arrange
    let forest = build_forest(&principal_with_staff(), &[]).unwrap();

    // Act
    let layout = lay_out(&forest, &Geometry::default());

    // Assert
    let root = &layout[0];
    assert_eq!(root.card.id, "A");
    assert_eq!(root.reservation, 220);
    assert_eq!(root.staff_offset.horizontal, 140);
    assert_eq!(root.standard.len(), 1);
    assert_eq!(root.standard[0].card.id, "B");
    assert_eq!(root.standard[0].reservation, 0);
    let staff: Vec<&str> = root.staff.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(staff, vec!["C", "D"]);
}

#[test]
fn given_staff_with_own_children_when_laying_out_then_staff_stays_flat() {
    // Arrange
    let mut records = principal_with_staff();
    records.push(OrgNodeRecord::new("E", Some("C"), 0));
    let forest = build_forest(&records, &[]).unwrap();

    // Act
    let layout = lay_out(&forest, &Geometry::default());

    // Assert
    assert_eq!(layout[0].staff.len(), 2);
    assert_eq!(walk_forest(&forest).count(), 5);
}

#[test]
fn given_resolved_content_when_laying_out_then_cards_carry_display_fields() {
    // Arrange
    let records = vec![
        OrgNodeRecord::new("ceo", None, 0).with_member("m1"),
        OrgNodeRecord::new("office", Some("ceo"), 0)
            .with_custom("Office", Some("Support"))
            .with_layout(LayoutType::StaffRight)
            .with_line(LineType::Dotted),
        OrgNodeRecord::new("blank", Some("ceo"), 1),
    ];
    let members = vec![member("m1", "Chief Executive")];
    let forest = build_forest(&records, &members).unwrap();

    // Act
    let layout = lay_out(&forest, &Geometry::default());

    // Assert
    let root = &layout[0];
    assert_eq!(root.card.kind, CardKind::Personnel);
    assert_eq!(root.card.title.as_deref(), Some("Member m1"));
    assert_eq!(root.card.position.as_deref(), Some("Chief Executive"));
    assert_eq!(root.reservation, 130);

    let office = &root.staff[0];
    assert_eq!(office.kind, CardKind::Custom);
    assert_eq!(office.line_type, LineType::Dotted);
    assert_eq!(office.position.as_deref(), Some("Support"));

    assert_eq!(root.standard[0].card.kind, CardKind::Unlabeled);
    assert_eq!(root.standard[0].card.title, None);
}

#[test]
fn given_custom_geometry_when_laying_out_then_used_for_reservation() {
    let forest = build_forest(&principal_with_staff(), &[]).unwrap();
    let geometry = Geometry {
        unit_height: 100,
        padding: 0,
        staff_offset: 60,
    };

    let layout = lay_out(&forest, &geometry);

    assert_eq!(layout[0].reservation, 200);
    assert_eq!(layout[0].staff_offset.horizontal, 60);
}

#[test]
fn given_layout_when_serializing_then_json_has_lane_fields() {
    let forest = build_forest(&principal_with_staff(), &[]).unwrap();
    let layout = lay_out(&forest, &Geometry::default());

    let json = serde_json::to_value(&layout).unwrap();

    assert_eq!(json[0]["reservation"], 220);
    assert_eq!(json[0]["staff_offset"]["horizontal"], 140);
    assert_eq!(json[0]["staff"][0]["layout_type"], "staff_right");
    assert_eq!(json[0]["standard"][0]["card"]["kind"], "unlabeled");
}
