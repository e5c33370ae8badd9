use proptest::prelude::*;
use quarry_forms::intake::{IntakeError, coerce};
use quarry_forms::{
    ConfigFile, ConfigStore, DisplaySettings, FormDisplay, FormError, OptionType, Schema,
    Submission,
};
use quarry_kernel::domain::ConfigValue;
use quarry_kernel::domain::flags::Capabilities;
use quarry_kernel::domain::path;
use std::collections::BTreeMap;

fn setup_display() -> FormDisplay<ConfigFile> {
    FormDisplay::new(ConfigFile::setup(Schema::global()), DisplaySettings::default())
}

/// A submission holding the default of every registered field, as a browser
/// would post an untouched page.
fn untouched<S: ConfigStore>(display: &FormDisplay<S>) -> Submission {
    let schema = Schema::global();
    let mut submission = Submission::new();
    for form in display.forms() {
        for field in form.fields() {
            let key = path::translated_path(&path::work_path(&field.system_path, form.index));
            let default = schema.default_value(&field.system_path).cloned().unwrap_or_default();
            match field.option_type {
                OptionType::Boolean if default.is_empty() => {},
                OptionType::Boolean => {
                    submission.insert(key, "on".to_owned());
                },
                _ => {
                    submission.insert(key, default.as_display_string());
                },
            }
        }
    }
    submission.insert("submit_save".to_owned(), "Apply".to_owned());
    submission
}

fn set(submission: &mut Submission, key: &str, value: &str) {
    submission.insert(key.to_owned(), value.to_owned());
}

#[test]
fn only_values_differing_from_defaults_are_stored() {
    let mut display = setup_display();
    display.register_form("Browse", None).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "MaxRows", "50");
    for allowed in ["MaxRows", "Order", "RepeatCells"] {
        set(&mut submission, &format!("{allowed}-userprefs-allow"), "on");
    }

    assert!(display.process(&submission, false, true));
    assert!(!display.has_errors());

    let values = display.store().user_values();
    assert_eq!(values.get("MaxRows"), Some(&ConfigValue::Int(50)));
    assert!(!values.contains_key("Order"));
    assert!(!values.contains_key("RepeatCells"));
    assert!(!values.contains_key("UserprefsDisallow"));
}

#[test]
fn unchecked_userprefs_boxes_are_disallowed() {
    let mut display = setup_display();
    display.register_form("Browse", None).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "Order-userprefs-allow", "on");
    assert!(display.process(&submission, false, true));

    assert_eq!(
        display.store().user_values()["UserprefsDisallow"],
        ConfigValue::from(vec![ConfigValue::from("MaxRows"), ConfigValue::from("RepeatCells")])
    );
}

#[test]
fn submissions_without_the_save_button_are_ignored() {
    let mut display = setup_display();
    display.register_form("Browse", None).unwrap();

    let mut submission = untouched(&display);
    submission.remove("submit_save");
    set(&mut submission, "MaxRows", "50");

    assert!(!display.process(&submission, false, true));
    assert!(display.store().user_values().is_empty());
}

#[test]
fn missing_data_blocks_the_save() {
    let mut display = setup_display();
    display.register_form("Browse", None).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "MaxRows", "50");
    submission.remove("Order");

    assert!(!display.process(&submission, false, true));
    assert_eq!(display.errors()["Browse"], vec!["Missing data for Default sorting order".to_owned()]);
    assert!(!display.store().user_values().contains_key("MaxRows"));
}

#[test]
fn partial_save_keeps_the_valid_fields() {
    let mut display = setup_display();
    display.register_form("Text_fields", None).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "CharTextareaCols", "many");
    set(&mut submission, "TextareaRows", "30");

    assert!(!display.process(&submission, true, true));
    assert_eq!(display.errors()["CharTextareaCols"], vec!["Not a valid number!".to_owned()]);
    assert_eq!(display.store().user_values()["TextareaRows"], ConfigValue::Int(30));
    assert!(!display.store().user_values().contains_key("CharTextareaCols"));
}

#[test]
fn validator_errors_do_not_undo_the_save() {
    let mut display = setup_display();
    display.register_form("Text_fields", None).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "TextareaCols", "0");

    assert!(display.process(&submission, false, true));
    assert_eq!(display.errors()["TextareaCols"], vec!["Not a positive number!".to_owned()]);
    assert_eq!(display.store().user_values()["TextareaCols"], ConfigValue::Int(0));

    display.fix_errors();
    assert!(!display.store().user_values().contains_key("TextareaCols"));
    display.validate();
    assert!(!display.has_errors());
}

#[test]
fn new_server_lands_after_the_last_one() {
    let mut display = setup_display();
    display.register_group("Servers", Some(0)).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "Servers-0-host", "db.example.org");
    set(&mut submission, "Servers-0-port", "3307");
    set(&mut submission, "Servers-0-ssl", "on");

    assert!(display.process(&submission, false, true));
    assert!(!display.has_errors(), "{:?}", display.errors());
    assert!(display.forms().iter().all(|f| f.index == Some(1)));
    let html = display.display(true, "/setup/forms/Servers?server=1", &[]);
    assert!(html.contains("name=\"Servers-1-host\" value=\"db.example.org\""));

    let store = display.into_store();
    assert_eq!(store.server_count(), 1);
    let values = store.user_values();
    assert_eq!(values["Servers/1/host"], ConfigValue::from("db.example.org"));
    assert_eq!(values["Servers/1/port"], ConfigValue::Int(3307));
    assert_eq!(values["Servers/1/ssl"], ConfigValue::Bool(true));
    // Persisted even though it equals the default.
    assert_eq!(values["Servers/1/auth_type"], ConfigValue::from("cookie"));
    assert!(!values.contains_key("Servers/1/compress"));
    assert!(values.keys().all(|k| !k.starts_with("Servers/0/")));

    let mut display = FormDisplay::new(store, DisplaySettings::default());
    display.register_group("Servers", Some(0)).unwrap();
    let mut submission = untouched(&display);
    set(&mut submission, "Servers-0-host", "replica.example.org");
    assert!(display.process(&submission, false, true));
    assert_eq!(display.store().server_count(), 2);
    assert_eq!(display.store().server_name(2), "replica.example.org");
}

#[test]
fn config_auth_requires_a_user() {
    let mut display = setup_display();
    display.register_group("Servers", Some(0)).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "Servers-0-auth_type", "config");
    set(&mut submission, "Servers-0-user", "");
    assert!(display.process(&submission, false, true));

    assert!(display.has_errors());
    assert_eq!(
        display.errors()["Servers/1/user"],
        vec!["Empty username while using config authentication method!".to_owned()]
    );
    assert!(display.display_errors().contains("User for config auth"));
    assert_eq!(display.store().user_values()["Servers/1/auth_type"], ConfigValue::from("config"));

    let html = display.display(true, "/setup/forms/Servers?server=1", &[]);
    assert!(html.contains("Empty username while using config authentication method!"));
}

#[test]
fn trusted_proxies_are_parsed_and_checked() {
    let mut display = setup_display();
    display.register_form("Security", None).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "TrustedProxies", "1.2.3.4: HTTP_X_FORWARDED_FOR\nbogus");
    assert!(display.process(&submission, false, true));

    let stored = display.store().user_values()["TrustedProxies"].clone();
    let ConfigValue::Map(map) = stored else { panic!("expected a map, got {stored:?}") };
    assert_eq!(map["1.2.3.4"], ConfigValue::from("HTTP_X_FORWARDED_FOR"));
    assert_eq!(map["-0"], ConfigValue::from("bogus"));
    assert_eq!(display.errors()["TrustedProxies"], vec!["Incorrect value: bogus".to_owned()]);

    let html = display.display(true, "/setup/forms/Features", &[]);
    assert!(html.contains("bogus\n1.2.3.4: HTTP_X_FORWARDED_FOR</textarea>"));
    assert!(html.contains("<dd>Incorrect value: bogus</dd>"));
}

#[test]
fn rendered_page_carries_values_and_helpers() {
    let mut display = setup_display();
    display.register_group("Main_panel", None).unwrap();

    let html = display.display(true, "/setup/forms/Main_panel", &[("token", "abc")]);
    assert!(html.starts_with("<form method=\"post\" action=\"/setup/forms/Main_panel\""));
    assert!(html.contains("<input type=\"hidden\" name=\"token\" value=\"abc\">"));
    assert!(html.contains("<ul class=\"tabs\">"));
    assert!(html.contains("<option value=\"25\" selected>25</option>"));
    assert!(html.contains("href=\"./doc/html/config.html#cfg_MaxRows\""));
    assert!(html.contains("id=\"MaxRows-userprefs-allow\""));
    assert_eq!(html.matches("name=\"submit_save\"").count(), 4);
}

#[test]
fn missing_compression_support_is_pointed_out() {
    let settings = DisplaySettings {
        capabilities: Capabilities::ALL - Capabilities::BZIP2,
        ..DisplaySettings::default()
    };
    let mut display = FormDisplay::new(ConfigFile::setup(Schema::global()), settings);
    display.register_form("Other_core", None).unwrap();

    let html = display.display(false, "/setup", &[]);
    assert!(html.contains("missing bzip2 support"));
    assert!(!html.contains("missing gzip support"));
    assert!(!html.contains("name=\"submit_save\""));
}

fn base() -> BTreeMap<String, ConfigValue> {
    BTreeMap::from([
        ("MaxDbList".to_owned(), ConfigValue::Int(100)),
        (
            "UserprefsDisallow".to_owned(),
            ConfigValue::from(vec![ConfigValue::from("MaxRows")]),
        ),
    ])
}

fn prefs_display() -> FormDisplay<ConfigFile> {
    FormDisplay::new(ConfigFile::user_preferences(Schema::global(), base()), DisplaySettings::default())
}

#[test]
fn user_preferences_hide_setup_only_forms() {
    let mut display = prefs_display();
    assert!(matches!(display.register_group("Servers", None), Err(FormError::UnknownGroup { .. })));
    assert!(matches!(display.register_form("Security", None), Err(FormError::UnknownForm { .. })));

    // Security is skipped, the rest of the group is available.
    display.register_group("Features", None).unwrap();
    let names: Vec<_> = display.forms().iter().map(|f| f.name).collect();
    assert_eq!(names, ["General", "Text_fields", "Console"]);
}

#[test]
fn user_preferences_drop_disallowed_fields() {
    let mut display = prefs_display();
    display.register_form("Browse", None).unwrap();

    let fields: Vec<_> = display.forms()[0].fields().map(|f| f.system_path.as_str()).collect();
    assert_eq!(fields, ["Order", "RepeatCells"]);

    let html = display.display(true, "/prefs/alice/forms/Main_panel", &[]);
    assert!(!html.contains("name=\"MaxRows\""));
    assert!(!html.contains("userprefs-allow"));
}

#[test]
fn user_preferences_are_bounded_by_the_base() {
    let mut display = prefs_display();
    display.register_form("Navi_databases", None).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "MaxDbList", "150");
    assert!(display.process(&submission, false, true));
    assert_eq!(
        display.errors()["MaxDbList"],
        vec!["Value must be less than or equal to 100!".to_owned()]
    );

    let html = display.display(true, "/prefs/alice/forms/Navi_panel", &[]);
    assert!(html.contains("maximum 100"));
}

#[test]
fn user_preferences_store_differences_from_the_base() {
    let mut display = prefs_display();
    display.register_form("Navi_databases", None).unwrap();

    let mut submission = untouched(&display);
    set(&mut submission, "MaxDbList", "100");
    set(&mut submission, "MaxTableList", "50");
    assert!(display.process(&submission, false, true));
    assert!(!display.has_errors(), "{:?}", display.errors());

    let values = display.store().user_values();
    assert!(!values.contains_key("MaxDbList"));
    assert_eq!(values["MaxTableList"], ConfigValue::Int(50));
    assert!(!values.contains_key("UserprefsDisallow"));
}

proptest! {
    #[test]
    fn integers_survive_intake(n in any::<i64>()) {
        prop_assert_eq!(coerce(OptionType::Integer, Some(&n.to_string()), &[]), Ok(ConfigValue::Int(n)));
    }

    #[test]
    fn letters_are_never_numbers(s in "[a-z]{1,8}") {
        prop_assert_eq!(coerce(OptionType::Integer, Some(&s), &[]), Err(IntakeError::NotANumber));
    }

    #[test]
    fn checkboxes_are_set_by_any_value_but_zero(s in "[a-z1-9]{1,8}") {
        prop_assert_eq!(coerce(OptionType::Boolean, Some(&s), &[]), Ok(ConfigValue::Bool(true)));
    }
}
