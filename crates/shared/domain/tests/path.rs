use proptest::prelude::*;
use quarry_domain::path::{canonical_path, server_index, translated_path, untranslate, work_path};

fn system_path() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z_]{1,12}(/[A-Za-z_]{1,12}){0,2}",
        "[A-Za-z_]{1,12}(/[A-Za-z_]{1,12}){0,1}".prop_map(|rest| format!("Servers/1/{rest}")),
    ]
}

proptest! {
    #[test]
    fn canonical_undoes_work_path(path in system_path(), server in 0u32..500) {
        let work = work_path(&path, Some(server));
        let canonical = canonical_path(&work);
        prop_assert_eq!(canonical.as_ref(), path.as_str());
    }

    #[test]
    fn work_path_carries_the_server(rest in "[a-z]{1,10}", server in 0u32..500) {
        let system = format!("Servers/1/{rest}");
        prop_assert_eq!(server_index(&work_path(&system, Some(server))), Some(server));
    }

    #[test]
    fn translation_removes_separators(path in system_path()) {
        let id = translated_path(&path);
        prop_assert!(!id.contains('/'));
        prop_assert_eq!(untranslate(&id), path);
    }
}
