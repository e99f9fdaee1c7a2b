#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

const ROSTER: &str = r#""PLANT INFORMATION"
"Plant Name","Delhi"
""
"VALUE STREAM LEADERS (VSL)"
"VSL ID","Full Name","Initials","Email"
"VSL1","John Smith","","john@example.com"
"VSL2","Asha Rao","AR","asha@example.com"
""
"CROSS FUNCTIONAL TEAM (CFT) — LINKED TO EACH VSL"
"VSL ID (Linked)","CFT Member Full Name","Initials","Email"
"VSL1","Carl Diaz","","carl@example.com"
""
"CUSTOMER QUALITY ENGINEERS (CQE)"
"CQE ID","Full Name","Initials","Email"
"CQE1","Quinn Lee","QL",""
""
"PLANT HEADS (PH)"
"PH ID","Full Name","Initials","Email"
"PH1","Priya Das","",""
""
"#;

fn cli(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lpa-calendar").unwrap();
    cmd.arg("--data-dir").arg(data);
    cmd
}

const SEPTEMBER: [&str; 4] = ["--year", "2025", "--month", "9"];

#[test]
fn upload_generate_export_and_mail() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let roster = dir.path().join("roster.csv");
    std::fs::write(&roster, ROSTER).unwrap();

    cli(&data)
        .args(["upload", "--csv"])
        .arg(&roster)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Roster staged for Delhi: 2 VSL, 1 CFT, 1 CQE, 1 PH",
        ));

    // Air : JS + CD, Oil : AR, 26 jours ouvrés ; le 28 est un dimanche
    cli(&data)
        .args(["generate", "--plant", "Delhi", "--seed", "7"])
        .args(SEPTEMBER)
        .assert()
        .success()
        .stdout(predicate::str::contains("LPA calendar for Delhi (September 2025)"))
        .stdout(predicate::str::contains("Value Stream Leader: 39"))
        .stdout(predicate::str::contains("CFT Member: 13"))
        .stdout(predicate::str::contains("Plant Head: 1"));

    cli(&data)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Delhi | September 2025"));

    cli(&data)
        .args(["show", "--plant", "Delhi"])
        .args(SEPTEMBER)
        .assert()
        .success()
        .stdout(predicate::str::contains("SEPTEMBER 2025 - Delhi"))
        .stdout(predicate::str::contains("[Air]"))
        .stdout(predicate::str::contains("[Oil]"))
        .stdout(predicate::str::contains("Holiday"));

    let grid = dir.path().join("grid.csv");
    let flat = dir.path().join("flat.csv");
    let json = dir.path().join("calendar.json");
    cli(&data)
        .args(["export", "--plant", "Delhi"])
        .args(SEPTEMBER)
        .arg("--csv")
        .arg(&grid)
        .arg("--flat-csv")
        .arg(&flat)
        .arg("--json")
        .arg(&json)
        .assert()
        .success();
    assert!(std::fs::read_to_string(&grid).unwrap().starts_with("SEPTEMBER 2025 - Delhi"));
    assert!(std::fs::read_to_string(&flat).unwrap().starts_with("date,line,manager,type"));
    assert!(std::fs::read_to_string(&json).unwrap().contains("\"plant\": \"Delhi\""));

    let mail = dir.path().join("mail.txt");
    cli(&data)
        .args(["mail", "--plant", "Delhi"])
        .args(SEPTEMBER)
        .arg("--out")
        .arg(&mail)
        .assert()
        .success()
        .stdout(predicate::str::contains("john@example.com"));
    let text = std::fs::read_to_string(&mail).unwrap();
    assert!(text.starts_with("To: john@example.com, asha@example.com, carl@example.com\n"));
    assert!(text.contains("Subject: LPA Calendar – Delhi (September 2025)"));
    // classeur écrit à côté du message
    #[cfg(feature = "xlsx")]
    {
        assert!(text.contains("Attachment: LPA_Calendar_Delhi_September_2025.xlsx"));
        assert!(dir.path().join("LPA_Calendar_Delhi_September_2025.xlsx").exists());
    }

    // roster consommé par l'envoi
    cli(&data)
        .args(["generate", "--plant", "Delhi"])
        .args(SEPTEMBER)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no roster staged for plant Delhi"));
}

fn nagpur_roster(widgets: u32) -> String {
    format!(
        r#""PLANT INFORMATION"
"Plant Name","Nagpur"
""
"VALUE STREAM LEADERS (VSL)"
"VSL ID","Full Name","Initials","Email"
"VSL1","Nina Kale","NK","nina@example.com"
""
"VALUE STREAM CONFIGURATION"
"Value Stream","Sub-lines"
"Widgets","{widgets}"
""
"#
    )
}

#[test]
fn new_template_counts_apply_on_next_generation() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let roster = dir.path().join("nagpur.csv");

    std::fs::write(&roster, nagpur_roster(2)).unwrap();
    cli(&data).args(["upload", "--csv"]).arg(&roster).assert().success();
    cli(&data)
        .args(["generate", "--plant", "Nagpur"])
        .args(SEPTEMBER)
        .assert()
        .success();

    std::fs::write(&roster, nagpur_roster(4)).unwrap();
    cli(&data).args(["upload", "--csv"]).arg(&roster).assert().success();
    cli(&data)
        .args(["generate", "--plant", "Nagpur"])
        .args(SEPTEMBER)
        .assert()
        .success();

    cli(&data)
        .args(["show", "--plant", "Nagpur"])
        .args(SEPTEMBER)
        .assert()
        .success()
        .stdout(predicate::str::contains("Widgets Line 4"));
    // configuration issue des comptes : rien d'enregistré
    cli(&data)
        .arg("plants")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nagpur").not());
}

#[test]
fn explicit_config_is_stored_and_names_lines() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let roster = dir.path().join("nagpur.csv");
    let config = dir.path().join("nagpur.json");
    std::fs::write(&roster, nagpur_roster(4)).unwrap();
    std::fs::write(
        &config,
        r#"{"plant":"Nagpur","valueStreams":{"Widgets":["W-A","W-B"]}}"#,
    )
    .unwrap();

    cli(&data).args(["upload", "--csv"]).arg(&roster).assert().success();
    cli(&data)
        .args(["generate", "--plant", "Nagpur", "--config"])
        .arg(&config)
        .args(SEPTEMBER)
        .assert()
        .success();

    cli(&data)
        .arg("plants")
        .assert()
        .success()
        .stdout(predicate::str::contains("nagpur.json"))
        .stdout(predicate::str::contains("Widgets: 2 line(s)"));
    cli(&data)
        .args(["show", "--plant", "Nagpur"])
        .args(SEPTEMBER)
        .assert()
        .success()
        .stdout(predicate::str::contains("W-B"))
        .stdout(predicate::str::contains("Widgets Line").not());

    // configuration d'une autre usine
    let delhi = dir.path().join("delhi.csv");
    std::fs::write(&delhi, ROSTER).unwrap();
    cli(&data).args(["upload", "--csv"]).arg(&delhi).assert().success();
    cli(&data)
        .args(["generate", "--plant", "Delhi", "--config"])
        .arg(&config)
        .args(SEPTEMBER)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration is for plant Nagpur, not Delhi"));
}

#[test]
fn template_and_plants() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let out = dir.path().join("template.csv");

    cli(&data)
        .args(["template", "--out"])
        .arg(&out)
        .assert()
        .success();
    assert!(out.exists());

    // template vierge : nom d'usine manquant
    cli(&data)
        .args(["upload", "--csv"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing plant name"));

    cli(&data)
        .arg("plants")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pune (built-in)"))
        .stdout(predicate::str::contains("Air: 23 line(s)"));
}

#[test]
fn generate_rejects_invalid_month() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let roster = dir.path().join("roster.csv");
    std::fs::write(&roster, ROSTER).unwrap();
    cli(&data).args(["upload", "--csv"]).arg(&roster).assert().success();

    cli(&data)
        .args(["generate", "--plant", "Delhi", "--year", "2025", "--month", "13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid calendar month"));
}

#[cfg(feature = "xlsx")]
#[test]
fn export_xlsx_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let roster = dir.path().join("roster.csv");
    std::fs::write(&roster, ROSTER).unwrap();
    cli(&data).args(["upload", "--csv"]).arg(&roster).assert().success();
    cli(&data)
        .args(["generate", "--plant", "Delhi", "--seed", "1"])
        .args(SEPTEMBER)
        .assert()
        .success();

    let xlsx = dir.path().join("calendar.xlsx");
    cli(&data)
        .args(["export", "--plant", "Delhi", "--xlsx"])
        .arg(&xlsx)
        .args(SEPTEMBER)
        .assert()
        .success()
        .stdout(predicate::str::contains("XLSX written to"));
    assert!(std::fs::metadata(&xlsx).unwrap().len() > 0);
}
