#![forbid(unsafe_code)]
use chrono::{Duration, TimeZone, Utc};
use indexmap::IndexMap;
use lpa_calendar::{
    builtin_plant, builtin_plants, CalendarGenerator, CalendarMonth, CalendarStore,
    JsonCalendarStore, PlantConfig, PlantStore, Roster, RosterEntry, RosterStage, StagedRoster,
};
use tempfile::tempdir;

fn roster() -> Roster {
    Roster {
        value_stream_leaders: vec![RosterEntry::new("VSL1", "John Smith").with_initials("JS")],
        ..Roster::default()
    }
}

#[test]
fn calendar_store_save_replace_and_list() {
    let dir = tempdir().unwrap();
    let store = JsonCalendarStore::open(dir.path().join("calendars")).unwrap();
    let config = builtin_plant("Delhi").unwrap();
    let september = CalendarMonth::new(2025, 9).unwrap();
    let october = CalendarMonth::new(2025, 10).unwrap();
    let at = Utc.with_ymd_and_hms(2025, 8, 30, 9, 0, 0).unwrap();

    assert!(store.load("Delhi", september).unwrap().is_none());

    let mut generator = CalendarGenerator::seeded(1);
    let first = generator.generate(&roster(), &config, september, at);
    store.save(&first).unwrap();
    assert_eq!(store.load("Delhi", september).unwrap(), Some(first.clone()));
    // clé insensible à la casse
    assert!(store.load("delhi", september).unwrap().is_some());

    let second = generator.generate(&roster(), &config, september, at + Duration::hours(1));
    store.save(&second).unwrap();
    let loaded = store.load("Delhi", september).unwrap().unwrap();
    assert_eq!(loaded.generated_at, second.generated_at);
    assert_eq!(loaded.calendar_month(), Some(september));

    store
        .save(&generator.generate(&roster(), &config, october, at))
        .unwrap();
    assert_eq!(
        store.list().unwrap(),
        vec![
            ("Delhi".to_string(), "October 2025".to_string()),
            ("Delhi".to_string(), "September 2025".to_string()),
        ]
    );
}

#[test]
fn staged_rosters_are_kept_per_plant() {
    let dir = tempdir().unwrap();
    let stage = RosterStage::open(dir.path()).unwrap();
    let delhi = StagedRoster {
        plant: "Delhi".into(),
        roster: roster(),
        value_stream_counts: IndexMap::new(),
    };
    let mut counts = IndexMap::new();
    counts.insert("Air".to_string(), 2);
    let pune = StagedRoster {
        plant: "Pune".into(),
        roster: Roster::default(),
        value_stream_counts: counts,
    };

    stage.stage(&delhi).unwrap();
    stage.stage(&pune).unwrap();
    assert_eq!(stage.load("Delhi").unwrap(), Some(delhi.clone()));
    assert_eq!(stage.load("Pune").unwrap(), Some(pune));

    assert!(stage.clear("Delhi").unwrap());
    assert!(!stage.clear("Delhi").unwrap());
    assert!(stage.load("Delhi").unwrap().is_none());
    assert!(stage.load("Pune").unwrap().is_some());
}

#[test]
fn staged_roster_json_shape() {
    let staged = StagedRoster {
        plant: "Delhi".into(),
        roster: Roster {
            cross_functional_teams: vec![RosterEntry::new("CFT1", "Carl Diaz").with_group("VSL1")],
            plant_heads: vec![RosterEntry::new("PH1", "Priya Das")],
            ..Roster::default()
        },
        value_stream_counts: IndexMap::new(),
    };
    let json = serde_json::to_value(&staged).unwrap();
    assert_eq!(json["plant"], "Delhi");
    assert_eq!(json["crossFunctionalTeams"][0]["groupId"], "VSL1");
    assert_eq!(json["plantHODs"][0]["name"], "Priya Das");
    assert!(json.get("valueStreamCounts").is_none());

    // ancien nom de champ accepté
    let entry: RosterEntry =
        serde_json::from_str(r#"{"id":"CFT2","name":"Dana","group":"VSL2"}"#).unwrap();
    assert_eq!(entry.group_id.as_deref(), Some("VSL2"));
    assert_eq!(entry.initials, "");
}

#[test]
fn plant_config_from_template_counts() {
    let mut counts = IndexMap::new();
    counts.insert("Air".to_string(), 2);
    counts.insert("Oil".to_string(), 1);
    let mut names = IndexMap::new();
    names.insert("Air".to_string(), vec!["Line A1".to_string(), "Line A2".to_string()]);

    let config = PlantConfig::resolve("Delhi", &counts, Some(&names));
    assert_eq!(config.stream_names(), ["Air", "Oil"]);
    assert_eq!(config.lines_of("Air"), ["Line A1", "Line A2"]);
    assert_eq!(config.lines_of("Oil"), ["Oil Line 1"]);
    assert_eq!(config.stream_of("Oil Line 1"), Some("Oil"));
    assert_eq!(config.stream_of("Nowhere"), None);
    config.validate().unwrap();

    let generic = PlantConfig::resolve("Delhi", &counts, None);
    assert_eq!(generic.all_lines(), ["Air Line 1", "Air Line 2", "Oil Line 1"]);
}

#[test]
fn plant_config_validation() {
    assert!(PlantConfig::new("Empty").validate().is_err());
    assert!(PlantConfig::new(" ").with_stream("Air", ["A"]).validate().is_err());
    assert!(PlantConfig::new("X")
        .with_stream("Air", Vec::<String>::new())
        .validate()
        .is_err());
    let dup = PlantConfig::new("X")
        .with_stream("Air", ["Shared"])
        .with_stream("Oil", ["Shared"]);
    let err = dup.validate().unwrap_err();
    assert!(err.to_string().contains("Shared"));
}

#[test]
fn builtin_plant_table() {
    let names: Vec<_> = builtin_plants().into_iter().map(|p| p.plant).collect();
    assert_eq!(names, ["Pune", "Delhi", "Parwanu", "Chennai"]);

    let pune = builtin_plant(" pune ").unwrap();
    assert_eq!(pune.stream_names(), ["Oil", "EP", "Air"]);
    assert_eq!(pune.lines_of("Air").len(), 23);
    for plant in builtin_plants() {
        plant.validate().unwrap();
    }
    assert!(builtin_plant("Atlantis").is_none());
}

#[test]
fn plant_store_overrides_builtin_table() {
    let dir = tempdir().unwrap();
    let store = PlantStore::new(dir.path().join("plants"));

    assert_eq!(store.lookup("Delhi").unwrap(), builtin_plant("Delhi").unwrap());
    assert!(store.lookup("Atlantis").is_err());
    assert!(store.load("Delhi").is_err());

    let custom = PlantConfig::new("Delhi").with_stream("Air", ["D1", "D2", "D3"]);
    let path = store.save(&custom).unwrap();
    assert!(path.ends_with("delhi.json"));
    assert_eq!(store.lookup("DELHI").unwrap(), custom);

    let noida = PlantConfig::new("Noida").with_stream("Fuel", ["N1"]);
    store.save(&noida).unwrap();

    let infos = store.list().unwrap();
    let names: Vec<_> = infos.iter().map(|i| i.config.plant.as_str()).collect();
    assert_eq!(names, ["Chennai", "Delhi", "Noida", "Parwanu", "Pune"]);
    let delhi = infos.iter().find(|i| i.config.plant == "Delhi").unwrap();
    assert!(delhi.path.is_some());
    assert!(delhi.modified.is_some());
    assert_eq!(delhi.config, custom);
    let pune = infos.iter().find(|i| i.config.plant == "Pune").unwrap();
    assert!(pune.path.is_none());

    assert!(store.save(&PlantConfig::new("Bad")).is_err());
}
