#![forbid(unsafe_code)]
use lpa_calendar::io::{
    check_roster, derive_initials, export_assignments_csv, export_calendar_json, import_roster_csv,
    parse_roster_csv, write_template_csv,
};
use lpa_calendar::{
    collect_recipients, prepare_calendar_mail, CalendarGenerator, CalendarMonth, CalendarResult,
    Roster, RosterEntry, TextMail,
};
use chrono::{TimeZone, Utc};
use tempfile::tempdir;

const FILLED: &str = r#""LPA CALENDAR TEMPLATE"
""
"PLANT INFORMATION"
"Plant Name","Delhi"
""
"VALUE STREAM LEADERS (VSL)"
"VSL ID","Full Name","Initials","Email"
"VSL1","John Smith","","john@example.com"
"VSL2","Asha Rao","AR"," asha@example.com "
"VSL3","","",""
""
"CROSS FUNCTIONAL TEAM (CFT) — LINKED TO EACH VSL"
"VSL ID (Linked)","CFT Member Full Name","Initials","Email"
"VSL1","Carl Diaz","","carl@example.com"
"VSL2","","",""
""
"CUSTOMER QUALITY ENGINEERS (CQE)"
"CQE ID","Full Name","Initials","Email"
"CQE1","Quinn Lee","QL","john@example.com"
""
"PLANT HEADS (PH)"
"PH ID","Full Name","Initials","Email"
"PH1","Priya Das","",""
""
"VALUE STREAM CONFIGURATION"
"Value Stream","Sub-lines"
"Air","2"
"Oil","x"
""
"NOTE","Value streams are configured in the app"
"#;

#[test]
fn parse_filled_template() {
    let staged = parse_roster_csv(FILLED.as_bytes(), None).unwrap();
    assert_eq!(staged.plant, "Delhi");

    let vsl = &staged.roster.value_stream_leaders;
    assert_eq!(vsl.len(), 2);
    assert_eq!(vsl[0].id, "VSL1");
    assert_eq!(vsl[0].initials, "JS");
    assert_eq!(vsl[1].initials, "AR");
    assert_eq!(vsl[1].email, "asha@example.com");

    let cft = &staged.roster.cross_functional_teams;
    assert_eq!(cft.len(), 1);
    assert_eq!(cft[0].id, "CFT1");
    assert_eq!(cft[0].group_id.as_deref(), Some("VSL1"));
    assert_eq!(cft[0].initials, "CD");
    assert!(cft[0].supports("vsl1"));

    assert_eq!(staged.roster.customer_quality_engineers.len(), 1);
    assert_eq!(staged.roster.plant_heads[0].initials, "PD");

    let counts: Vec<_> = staged
        .value_stream_counts
        .iter()
        .map(|(vs, n)| (vs.as_str(), *n))
        .collect();
    assert_eq!(counts, [("Air", 2), ("Oil", 1)]);
    check_roster(&staged).unwrap();
}

#[test]
fn plant_override_wins_over_file() {
    let staged = parse_roster_csv(FILLED.as_bytes(), Some(" Pune ")).unwrap();
    assert_eq!(staged.plant, "Pune");
}

#[test]
fn blank_template_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("template.csv");
    write_template_csv(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("\"LPA CALENDAR TEMPLATE\""));
    assert!(text.contains("\"VALUE STREAM LEADERS (VSL)\""));
    assert!(text.contains("\"PLANT HEADS (PH)\""));

    // nom d'usine encore à remplir
    let err = import_roster_csv(&path, None).unwrap_err();
    assert!(format!("{err:#}").contains("missing plant name"));

    let staged = import_roster_csv(&path, Some("Pune")).unwrap();
    assert!(staged.roster.is_empty());
    assert!(staged.value_stream_counts.is_empty());
    assert!(check_roster(&staged).is_err());
}

#[test]
fn initials_from_names() {
    assert_eq!(derive_initials("John Smith"), "JS");
    assert_eq!(derive_initials("  anne   marie  durand "), "AMD");
    assert_eq!(derive_initials(""), "");
}

fn generated() -> (Roster, CalendarResult, CalendarMonth) {
    let staged = parse_roster_csv(FILLED.as_bytes(), None).unwrap();
    let config = lpa_calendar::builtin_plant("Delhi").unwrap();
    let month = CalendarMonth::new(2025, 9).unwrap();
    let at = Utc.with_ymd_and_hms(2025, 8, 30, 9, 0, 0).unwrap();
    let result = CalendarGenerator::seeded(5).generate(&staged.roster, &config, month, at);
    (staged.roster, result, month)
}

#[test]
fn flat_csv_and_json_exports() {
    let dir = tempdir().unwrap();
    let (_, result, _) = generated();

    let csv_path = dir.path().join("assignments.csv");
    export_assignments_csv(&csv_path, &result).unwrap();
    let text = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("date,line,manager,type"));
    assert_eq!(lines.count(), result.assignments.len());
    assert!(text.contains("2025-09-01,"));
    assert!(text.contains("Value Stream Leader"));

    let json_path = dir.path().join("calendar.json");
    export_calendar_json(&json_path, &result).unwrap();
    let json = std::fs::read_to_string(&json_path).unwrap();
    assert!(json.contains("\"generatedAt\""));
    assert!(json.contains("\"type\": \"Value Stream Leader\""));
    let back: CalendarResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
}

#[test]
fn recipients_are_distinct_and_ordered() {
    let (roster, _, _) = generated();
    assert_eq!(
        collect_recipients(&roster),
        ["john@example.com", "asha@example.com", "carl@example.com"]
    );
}

#[test]
fn calendar_mail_subject_body_and_attachment() {
    let (roster, result, month) = generated();
    let mail = prepare_calendar_mail(&roster, &result, month, &TextMail).unwrap();
    assert_eq!(mail.subject, "LPA Calendar – Delhi (September 2025)");
    assert_eq!(mail.attachment, "LPA_Calendar_Delhi_September_2025.xlsx");
    assert!(mail.body.contains("Delhi (September 2025)"));
    assert!(mail.body.contains("Customer Quality Engineer"));
    assert_eq!(mail.recipients.len(), 3);
}

#[test]
fn calendar_mail_needs_an_address() {
    let (_, result, month) = generated();
    let mut roster = Roster {
        value_stream_leaders: vec![RosterEntry::new("VSL1", "No Mail")],
        plant_heads: vec![RosterEntry::new("PH1", "Blank Mail").with_email("   ")],
        ..Roster::default()
    };
    let err = prepare_calendar_mail(&roster, &result, month, &TextMail).unwrap_err();
    assert!(err.to_string().contains("no email address"));

    roster
        .cross_functional_teams
        .push(RosterEntry::new("CFT1", "Cleo Ray").with_email(" cleo@example.com "));
    let mail = prepare_calendar_mail(&roster, &result, month, &TextMail).unwrap();
    assert_eq!(mail.recipients, ["cleo@example.com"]);
}
