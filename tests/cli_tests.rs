//! Integration tests for CLI functionality

#[cfg(feature = "cli")]
mod cli_integration_tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    use clap::Parser;
    use tempfile::TempDir;

    use fsakit::cli::commands::{execute, load_automaton};
    use fsakit::cli::detect::{detect_format, DetectionMethod};
    use fsakit::cli::{Cli, FileFormat};
    use fsakit::prelude::*;

    fn run(config: &Path, args: &[&str]) {
        let mut argv = vec!["fsakit", "-c", config.to_str().unwrap()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        execute(cli).unwrap();
    }

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        EngineConfig::default().save(&config).unwrap();
        (dir, config)
    }

    fn path_str(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn test_all_words_then_complement() {
        let (dir, config) = setup();
        let short = dir.path().join("short.fsa");
        let long = dir.path().join("long.bin");
        run(&config, &["all-words", "1", "--letters", "2", "-o", path_str(&short)]);
        run(&config, &["not", path_str(&short), "-o", path_str(&long)]);

        let detection = detect_format(&long).unwrap();
        assert_eq!(detection.format, FileFormat::Bincode);
        assert_eq!(detection.method, DetectionMethod::Extension);

        let fsa = load_automaton(&long, StorageFormat::Default).unwrap();
        assert!(!fsa.accepts(&[1]));
        assert!(fsa.accepts(&[1, 0]));
    }

    #[test]
    fn test_binop_on_text_files() {
        let (dir, config) = setup();
        let two = dir.path().join("two.fsa");
        let three = dir.path().join("three.fsa");
        let out = dir.path().join("diff.json");
        run(&config, &["all-words", "2", "--names", "x,y", "-o", path_str(&two)]);
        run(&config, &["all-words", "3", "--names", "x,y", "-o", path_str(&three)]);
        run(
            &config,
            &["binop", path_str(&three), path_str(&two), "--op", "and-not", "-o", path_str(&out)],
        );

        let fsa = load_automaton(&out, StorageFormat::Default).unwrap();
        assert_eq!(fsa.alphabet().names(), ["x", "y"]);
        assert_eq!(fsa.language_size(5), 8);
    }

    #[test]
    fn test_text_output_is_readable() {
        let (dir, config) = setup();
        let path = dir.path().join("words.fsa");
        run(&config, &["all-words", "2", "-o", path_str(&path), "--name", "words"]);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("words := rec"));
        let detection = detect_format(&path).unwrap();
        assert_eq!(detection.format, FileFormat::Text);
    }

    #[test]
    fn test_content_detection_without_extension() {
        let (dir, config) = setup();
        let path = dir.path().join("words");
        run(&config, &["all-words", "1", "-o", path_str(&path), "-f", "text"]);
        let detection = detect_format(&path).unwrap();
        assert_eq!(detection.format, FileFormat::Text);
        assert_eq!(detection.method, DetectionMethod::Content);
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("absent.json");
        let cli = Cli::try_parse_from(["fsakit", "-c", path_str(&config), "all-words", "1"]).unwrap();
        assert!(execute(cli).is_err());
    }
}
