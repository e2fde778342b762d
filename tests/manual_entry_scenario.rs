use chatipelago_admin::content::{ContentSpec, ManualEntry};
use chatipelago_admin::validation::{validate_content, FlatCounts};
use pretty_assertions::assert_eq;

#[test]
fn three_items_and_nothing_else() {
    let entry = ManualEntry {
        items: "Sword\n  Shield  \n\nPotion\n".to_string(),
        ..ManualEntry::default()
    };
    let doc = entry.normalize().expect("items box has content");
    assert!(doc.is_nested());
    assert!(validate_content(&doc, &FlatCounts::current()).is_valid());
    assert!(validate_content(&doc, &FlatCounts::legacy()).is_valid());

    let spec = ContentSpec::from_document(doc).unwrap();
    assert_eq!(spec.items.normal, vec!["Sword", "Shield", "Potion"]);
    assert!(spec.items.prog.is_empty());
    assert!(spec.items.trap.is_empty());
    assert!(spec.items.filler.is_empty());
    assert!(spec.locations.chatroom.is_empty());
    assert!(spec.locations.prog.is_empty());
}

#[test]
fn blank_boxes_mean_no_content() {
    let entry = ManualEntry {
        items: "   \n\n".to_string(),
        locations: "\r\n".to_string(),
        ..ManualEntry::default()
    };
    assert!(entry.normalize().is_none());
    assert!(ManualEntry::default().normalize().is_none());
}

#[test]
fn every_box_lands_in_its_group() {
    let entry = ManualEntry {
        items: "a".into(),
        prog_items: "b".into(),
        trap_items: "c".into(),
        locations: "d".into(),
        prog_locations: "e".into(),
    };
    let spec = ContentSpec::from_document(entry.normalize().unwrap()).unwrap();
    assert_eq!(spec.items.normal, vec!["a"]);
    assert_eq!(spec.items.prog, vec!["b"]);
    assert_eq!(spec.items.trap, vec!["c"]);
    assert_eq!(spec.locations.chatroom, vec!["d"]);
    assert_eq!(spec.locations.prog, vec!["e"]);
}
