/* 📖 # End-to-end scenarios on a real disk

Each scenario runs the full open, mutate, close cycle through RealPal in a temporary
directory and then inspects the file with plain std::fs, the way a user would.
*/

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use expect_test::expect;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use crate::{ErrorKind, LiveFile, LiveFiles, Options};

    fn setup() -> (TempDir, LiveFiles) {
        let dir = TempDir::new().unwrap();
        let files = LiveFiles::in_directory(dir.path());
        (dir, files)
    }

    fn read(dir: &TempDir, name: &str) -> String {
        fs::read_to_string(dir.path().join(name)).unwrap()
    }

    fn sample() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("hello".to_string(), "world".to_string()),
            ("name".to_string(), "live file".to_string()),
        ])
    }

    #[test]
    fn test_json_scenario() {
        let (dir, files) = setup();
        let mut file: LiveFile<Value> = files.json("data.json", Options::default()).unwrap();
        assert!(!file.is_present());
        file.set_data(json!({"hello": "world"}));
        file.close().unwrap();

        let reparsed: Value = serde_json::from_str(&read(&dir, "data.json")).unwrap();
        assert_eq!(reparsed, json!({"hello": "world"}));
    }

    #[test]
    fn test_yaml_scenario() {
        let (dir, files) = setup();
        fs::write(dir.path().join("data.yaml"), "foo: bar\nbaz:\n  - qux\n  - quux\n").unwrap();
        let mut file: LiveFile<Value> = files.yaml("data.yaml", Options::default()).unwrap();
        file.data_mut().unwrap()["baz"]
            .as_array_mut()
            .unwrap()
            .push(json!("corge"));
        file.close().unwrap();

        let text = read(&dir, "data.yaml");
        let reparsed: Value = serde_yaml::from_str(&text).unwrap();
        assert_eq!(
            reparsed,
            json!({"foo": "bar", "baz": ["qux", "quux", "corge"]})
        );
        expect![[r#"
            foo: bar
            baz:
            - qux
            - quux
            - corge
        "#]]
        .assert_eq(&text);
    }

    #[test]
    fn test_toml_writer_output() {
        let (dir, files) = setup();
        let mut file = files
            .toml::<BTreeMap<String, String>>("data.toml", Options::default())
            .unwrap();
        file.set_data(BTreeMap::from([("hello".to_string(), "world".to_string())]));
        file.close().unwrap();
        assert_eq!(read(&dir, "data.toml"), "hello = \"world\"\n");
    }

    #[test]
    fn test_jsonc_preservation_scenario() {
        let (dir, files) = setup();
        fs::write(dir.path().join("data.jsonc"), r#"{"hello": "world"} // comment"#).unwrap();
        let mut file: LiveFile<Value> = files.jsonc("data.jsonc", Options::default()).unwrap();
        file.set_data(json!({"foo": "bar"}));
        file.close().unwrap();

        let text = read(&dir, "data.jsonc");
        expect![[r#"
            {
              "foo": "bar"
            } // comment
        "#]]
        .assert_eq(&text);
        let reopened: LiveFile<Value> = files.jsonc("data.jsonc", Options::default()).unwrap();
        assert_eq!(reopened.data(), Some(&json!({"foo": "bar"})));
    }

    #[test]
    fn test_missing_file_is_not_created() {
        let (dir, files) = setup();
        let file: LiveFile<Value> = files.json("never.json", Options::default()).unwrap();
        file.close().unwrap();
        assert!(!dir.path().join("never.json").exists());
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let (dir, files) = setup();
        fs::create_dir(dir.path().join("settings.json")).unwrap();
        let err = files
            .json::<Value>("settings.json", Options::default())
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NotFound { .. }));
        assert!(dir.path().join("settings.json").is_dir());
    }

    #[test]
    fn test_round_trip_structured_formats() {
        let (_dir, files) = setup();
        type Open = fn(&LiveFiles, &str) -> livefile_base::LivefileResult<LiveFile<BTreeMap<String, String>>>;
        let formats: [(&str, Open); 4] = [
            ("data.json", |files, path| files.json(path, Options::default())),
            ("data.jsonc", |files, path| files.jsonc(path, Options::default())),
            ("data.toml", |files, path| files.toml(path, Options::default())),
            ("data.yaml", |files, path| files.yaml(path, Options::default())),
        ];
        for (path, open) in formats {
            let mut file = open(&files, path).unwrap();
            file.set_data(sample());
            file.close().unwrap();

            let reopened = open(&files, path).unwrap();
            assert_eq!(reopened.data(), Some(&sample()), "round trip through {}", path);
        }
    }

    #[test]
    fn test_round_trip_text() {
        let (dir, files) = setup();
        let mut file = files.text("notes.txt", Options::default()).unwrap();
        file.set_data("first line\nsecond line".to_string());
        file.close().unwrap();
        assert_eq!(read(&dir, "notes.txt"), "first line\nsecond line");

        let mut file = files.text("notes.txt", Options::default()).unwrap();
        file.data_mut().unwrap().push_str("\nthird line\n");
        file.close().unwrap();

        let reopened = files.text("notes.txt", Options::default()).unwrap();
        assert_eq!(
            reopened.data().map(String::as_str),
            Some("first line\nsecond line\nthird line\n")
        );
    }

    #[test]
    fn test_jsonc_round_trip_keeps_comments_of_untouched_keys() {
        let (dir, files) = setup();
        fs::write(
            dir.path().join("app.jsonc"),
            "{\n  // where to listen\n  \"port\": 8080,\n  \"debug\": false, // flip for local runs\n}\n",
        )
        .unwrap();
        let file: LiveFile<Value> = files.jsonc("app.jsonc", Options::default()).unwrap();
        file.scoped(|file| {
            if let Some(data) = file.data_mut() {
                data["port"] = json!(9090);
            }
            Ok(())
        })
        .unwrap();
        assert_eq!(
            read(&dir, "app.jsonc"),
            "{\n  // where to listen\n  \"port\": 9090,\n  \"debug\": false, // flip for local runs\n}\n"
        );
    }
}
