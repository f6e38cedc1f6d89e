use serde_json::{json, Value};
use stowbox_core::db::open_db_in_memory;
use stowbox_core::{
    GridLayout, OrganizerConfig, OrganizerService, RowRange, SqliteItemRepository, Tagger,
};

type Service<'conn> = OrganizerService<SqliteItemRepository<'conn>>;

fn send(service: &mut Service<'_>, command: &str, data: Value) -> Value {
    let request = json!({ "command": command, "data": data }).to_string();
    let response = service.handle_request(&request);
    serde_json::to_value(&response).unwrap()
}

fn insert(service: &mut Service<'_>, info: &str) -> Value {
    send(service, "InsertItem", json!({ "Info": info }))
}

fn boxes(service: &mut Service<'_>) -> String {
    let response = send(service, "ShowAllBoxes", Value::Null);
    response["Coordinates"].as_str().unwrap().to_string()
}

fn tiny_grid() -> OrganizerConfig {
    OrganizerConfig {
        grid: GridLayout {
            columns: 2,
            small_rows: RowRange::new(0, 1),
            large_rows: RowRange::new(1, 2),
        },
        ..OrganizerConfig::default()
    }
}

#[test]
fn insert_fills_each_size_region_row_major() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    assert_eq!(
        insert(&mut service, "resistors"),
        json!({"Command": "InsertItem", "Success": true, "Row": 0, "Col": 0, "Name": "resistors"})
    );
    let big = insert(&mut service, "capacitors into a big box");
    assert_eq!((big["Row"].as_u64(), big["Col"].as_u64()), (Some(4), Some(0)));
    assert_eq!(big["Name"], "capacitors");

    let tagged = insert(&mut service, "LEDs with tags light red");
    assert_eq!((tagged["Row"].as_u64(), tagged["Col"].as_u64()), (Some(0), Some(1)));
    assert_eq!(tagged["Name"], "LEDs");

    assert_eq!(boxes(&mut service), "aaabea");
}

#[test]
fn inserting_a_stored_item_reports_its_box_without_allocating() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "AA batteries");
    let again = insert(&mut service, "aa battery into a big box");

    assert_eq!(again["Success"], true);
    assert_eq!(again["AlreadyStored"], true);
    assert_eq!(again["Name"], "AA batteries");
    assert_eq!((again["Row"].as_u64(), again["Col"].as_u64()), (Some(0), Some(0)));
    assert_eq!(boxes(&mut service), "aa");
}

#[test]
fn full_region_fails_insert_but_other_size_still_allocates() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), tiny_grid());

    insert(&mut service, "fuses");
    insert(&mut service, "relays");
    let full = insert(&mut service, "diodes");
    assert_eq!(
        full,
        json!({"Command": "InsertItem", "Success": false, "Name": "diodes"})
    );

    let big = insert(&mut service, "motors in a large box");
    assert_eq!((big["Row"].as_u64(), big["Col"].as_u64()), (Some(1), Some(0)));
    assert_eq!(boxes(&mut service), "aaabba");
}

#[test]
fn removing_frees_the_box_and_unknown_items_change_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "screws");
    insert(&mut service, "nails");

    let missing = send(&mut service, "RemoveItem", json!("ghost"));
    assert_eq!(
        missing,
        json!({"Command": "RemoveItem", "Success": false, "Name": "ghost"})
    );
    assert_eq!(boxes(&mut service), "aaab");

    let removed = send(&mut service, "RemoveItem", json!("Screw"));
    assert_eq!(removed["Success"], true);
    assert_eq!((removed["Row"].as_u64(), removed["Col"].as_u64()), (Some(0), Some(0)));
    assert_eq!(boxes(&mut service), "ab");

    let reused = insert(&mut service, "bolts");
    assert_eq!((reused["Row"].as_u64(), reused["Col"].as_u64()), (Some(0), Some(0)));
}

#[test]
fn quantity_updates_add_subtract_and_set() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "spacers");

    let set = send(&mut service, "SetQuantity", json!({"Item": "spacer", "Quantity": 10}));
    assert_eq!(set["Command"], "SetQuantity");
    assert_eq!(set["Result"][0]["Quantity"], 10);

    let down = send(
        &mut service,
        "UpdateQuantity",
        json!({"Item": "spacers", "Quantity": 3, "Add": false}),
    );
    assert_eq!(down["Command"], "UpdateQuantity");
    assert_eq!(down["Count"], 1);
    assert_eq!(down["Result"][0]["Quantity"], 7);

    send(&mut service, "SetQuantity", json!({"Item": "spacers", "Quantity": 10}));
    let up = send(&mut service, "UpdateQuantity", json!({"Item": "spacers", "Quantity": 3}));
    assert_eq!(up["Result"][0]["Quantity"], 13);

    let missing = send(&mut service, "UpdateQuantity", json!({"Item": "glue", "Quantity": 1}));
    assert_eq!(
        missing,
        json!({"Command": "UpdateQuantity", "Success": false, "Count": -1, "Name": "glue"})
    );
}

#[test]
fn find_item_matches_exact_name_then_falls_back_to_tags() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "red wire with tags copper");

    let exact = send(&mut service, "FindItem", json!("Red Wires"));
    assert_eq!(
        exact,
        json!({
            "Command": "FindItem",
            "Success": true,
            "Count": 1,
            "Result": [{"Name": "red wire", "Quantity": 1, "Row": 0, "Col": 0}]
        })
    );

    let fuzzy = send(&mut service, "FindItem", json!("copper cable"));
    assert_eq!(fuzzy["Success"], true);
    assert_eq!(fuzzy["Fuzzy"], true);
    assert_eq!(fuzzy["Result"][0]["Name"], "red wire");

    let miss = send(&mut service, "FindItem", json!("unicorn"));
    assert_eq!(
        miss,
        json!({"Command": "FindItem", "Success": false, "Count": -1, "Name": "unicorn"})
    );
}

#[test]
fn find_tags_ranks_by_overlap_and_reports_query_size() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "drill bits with tags metal wood");
    insert(&mut service, "saw blades with tags metal");
    insert(&mut service, "sandpaper with tags wood");

    let response = send(&mut service, "FindTags", json!("metal wood"));
    assert_eq!(response["Count"], 2);
    let hits = response["Result"].as_array().unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0]["Name"], "drill bits");
    assert_eq!(hits[0]["TagsMatched"], 2);
    assert_eq!(hits[1]["TagsMatched"], 1);

    let nothing = send(&mut service, "FindTags", json!("plastic"));
    assert_eq!(nothing["Success"], false);
    assert_eq!(nothing["Count"], 1);
    assert_eq!(nothing["Result"], json!([]));
}

#[test]
fn add_tags_links_only_new_tags_to_stored_items() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "heat shrink");

    let added = send(&mut service, "AddTags", json!("tubes insulation to heat shrink"));
    assert_eq!(added["Success"], true);
    assert_eq!(added["TagsAdded"], 2);

    let repeated = send(&mut service, "AddTags", json!("heat shrink add tags tube"));
    assert_eq!(repeated["TagsAdded"], 0);

    let found = send(&mut service, "FindTags", json!("insulation"));
    assert_eq!(found["Result"][0]["Name"], "heat shrink");

    let missing = send(&mut service, "AddTags", json!("blue to ghost"));
    assert_eq!(missing["Success"], false);
    assert_eq!(missing["TagsAdded"], -1);
}

#[test]
fn bundle_shares_the_box_of_a_named_item() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "jumper wires");
    insert(&mut service, "breadboard into a big box");

    let bundled = send(
        &mut service,
        "BundleWith",
        json!({"Info": "spare jumpers with breadboard add tags prototyping", "Quantity": 5}),
    );
    assert_eq!(
        bundled,
        json!({
            "Command": "BundleWith",
            "Success": true,
            "Name": "spare jumpers",
            "Quantity": 5,
            "BundledWith": "breadboard",
            "Row": 4,
            "Col": 0
        })
    );
    assert_eq!(boxes(&mut service), "aaea");

    let count = send(&mut service, "HowMany", json!("spare jumper"));
    assert_eq!(count["Quantity"], 5);
    assert_eq!((count["Row"].as_u64(), count["Col"].as_u64()), (Some(4), Some(0)));

    let tagged = send(&mut service, "FindTags", json!("prototyping"));
    assert_eq!(tagged["Result"][0]["Name"], "spare jumpers");

    let unknown = send(&mut service, "BundleWith", json!({"Info": "clips with ghost"}));
    assert_eq!(unknown, json!({"Command": "BundleWith", "Success": false}));
}

#[test]
fn bundle_by_tags_needs_exactly_one_full_match() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "hex bolts with tags steel hex");
    insert(&mut service, "wood screws with tags steel");

    let unique = send(
        &mut service,
        "BundleWith",
        json!({"Info": "hex nuts with tags steel hex"}),
    );
    assert_eq!(unique["Success"], true);
    assert_eq!(unique["BundledWith"], "hex bolts");
    assert_eq!(unique["Quantity"], 1);
    assert_eq!((unique["Row"].as_u64(), unique["Col"].as_u64()), (Some(0), Some(0)));

    let ambiguous = send(&mut service, "BundleWith", json!({"Info": "washers with tags steel"}));
    assert_eq!(ambiguous, json!({"Command": "BundleWith", "Success": false}));

    let never_written = send(&mut service, "HowMany", json!("washers"));
    assert_eq!(never_written["Success"], false);
    assert_eq!(boxes(&mut service), "aaab");
}

#[test]
fn how_many_reports_quantity_of_a_single_match() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    send(&mut service, "InsertItem", json!({"Info": "fuses", "Quantity": 12}));

    assert_eq!(
        send(&mut service, "HowMany", json!("fuse")),
        json!({
            "Command": "HowMany",
            "Success": true,
            "Name": "fuses",
            "Quantity": 12,
            "Row": 0,
            "Col": 0
        })
    );
    assert_eq!(
        send(&mut service, "HowMany", json!("relays")),
        json!({"Command": "HowMany", "Success": false, "Name": "relays"})
    );
}

#[test]
fn unrecognized_and_malformed_requests_get_unknown_command() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    let dance = send(&mut service, "Dance", json!("now"));
    assert_eq!(
        dance,
        json!({
            "Command": "UnknownCommand",
            "Success": false,
            "UnknownCommand": "Dance",
            "Reason": "unrecognized_command"
        })
    );

    let bad_payload = send(&mut service, "SetQuantity", json!("ten"));
    assert_eq!(bad_payload["Reason"], "malformed_payload");
    assert_eq!(bad_payload["UnknownCommand"], "SetQuantity");

    let response = service.handle_request("not json");
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["Reason"], "malformed_request");
    assert_eq!(boxes(&mut service), "");
}

#[test]
fn quantity_changes_outside_integer_range_fail_and_keep_the_item() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "fuses");

    let negated = send(
        &mut service,
        "UpdateQuantity",
        json!({"Item": "fuses", "Quantity": i64::MIN, "Add": false}),
    );
    assert_eq!(
        negated,
        json!({"Command": "UpdateQuantity", "Success": false, "Count": -1, "Name": "fuses"})
    );

    send(&mut service, "SetQuantity", json!({"Item": "fuses", "Quantity": i64::MAX}));
    let overflow = send(&mut service, "UpdateQuantity", json!({"Item": "fuses", "Quantity": 1}));
    assert_eq!(overflow["Success"], false);
    assert_eq!(overflow["Count"], -1);

    let count = send(&mut service, "HowMany", json!("fuses"));
    assert_eq!(count["Success"], true);
    assert_eq!(count["Quantity"], i64::MAX);

    let removed = send(&mut service, "RemoveItem", json!("fuses"));
    assert_eq!(removed["Success"], true);
    assert_eq!(boxes(&mut service), "");
}

#[test]
fn blank_lookup_text_answers_with_no_query() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&mut conn).unwrap();
    let mut service = OrganizerService::new(repo, Tagger::default(), OrganizerConfig::default());

    insert(&mut service, "fuses");

    assert_eq!(
        send(&mut service, "FindTags", json!("   ")),
        json!({"Command": "FindTags", "Success": false, "Count": -1})
    );
    assert_eq!(
        send(&mut service, "FindItem", json!("")),
        json!({"Command": "FindItem", "Success": false, "Count": -1, "Name": ""})
    );
}
