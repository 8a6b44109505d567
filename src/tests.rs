#[cfg(test)]
mod tests {
    use crate::builders::reporter::ConsoleReporter;
    use crate::core::config::{Action, CliOptions, FixConfig, TraversalConfig};
    use crate::core::walker::TreeWalker;
    use crate::utils::load_traversal_config;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    const MESSY: &str = "#include \"a.h\"\n#include <b.h>\n#include <a.h>\nvoid f() { connect(x, SIGNAL(changed( const QString & s )), y, SLOT(update(const QString&))); }";
    const FIXED: &str = "#include \"a.h\"\n#include <b.h>\nvoid f() { connect(x, SIGNAL(changed(QStrings&)), y, SLOT(update(QString&))); }\n";

    fn setup_tree() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("lib").join("widgets")).unwrap();
        fs::write(root.join("lib").join("main.cpp"), MESSY).unwrap();
        fs::write(root.join("lib").join("widgets").join("button.h"), MESSY).unwrap();
        fs::write(root.join("lib").join("README"), "no newline").unwrap();
        (dir, root)
    }

    fn options(paths: Vec<PathBuf>) -> CliOptions {
        CliOptions {
            actions: vec![Action::All],
            paths,
            ..CliOptions::default()
        }
    }

    fn run(config: &TraversalConfig) -> crate::builders::reporter::RunSummary {
        let mut reporter = ConsoleReporter::new(Vec::new(), config.verbose, config.dry_run);
        TreeWalker::new(config).unwrap().run(&mut reporter)
    }

    fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<_> = walkdir::WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| (e.path().to_path_buf(), fs::read(e.path()).unwrap()))
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_full_run_over_tree() {
        let (_dir, root) = setup_tree();
        let config = TraversalConfig::merge(
            FixConfig::default(),
            CliOptions {
                recursive: true,
                ..options(vec![root.join("lib")])
            },
        );

        let summary = run(&config);
        assert_eq!(summary.files_visited, 3);
        assert_eq!(summary.files_written, 3);
        assert_eq!(fs::read_to_string(root.join("lib/main.cpp")).unwrap(), FIXED);
        assert_eq!(
            fs::read_to_string(root.join("lib/widgets/button.h")).unwrap(),
            FIXED
        );
        assert_eq!(fs::read_to_string(root.join("lib/README")).unwrap(), "no newline\n");

        // a second run finds nothing left to do
        let again = run(&config);
        assert_eq!(again.files_changed, 0);
    }

    #[test]
    fn test_dry_run_leaves_tree_byte_identical() {
        let (_dir, root) = setup_tree();
        let before = snapshot(&root);

        let config = TraversalConfig::merge(
            FixConfig::default(),
            CliOptions {
                recursive: true,
                dry_run: true,
                verbose: true,
                ..options(vec![root.clone()])
            },
        );
        let summary = run(&config);

        assert_eq!(summary.files_changed, 3);
        assert_eq!(summary.files_written, 0);
        assert_eq!(snapshot(&root), before);
    }

    #[test]
    fn test_pattern_filter_from_config_file() {
        let (_dir, root) = setup_tree();
        let config_path = root.join("fixsrc.toml");
        fs::write(
            &config_path,
            "actions = [\"ensure-trailing-newline\"]\npatterns = [\"*.cpp\"]\nrecursive = true\n",
        )
        .unwrap();

        let config = load_traversal_config(
            Some(config_path),
            CliOptions {
                paths: vec![root.join("lib")],
                ..CliOptions::default()
            },
        )
        .unwrap();
        let summary = run(&config);

        assert_eq!(summary.files_visited, 1);
        assert_eq!(
            fs::read_to_string(root.join("lib/main.cpp")).unwrap(),
            format!("{MESSY}\n")
        );
        assert_eq!(fs::read_to_string(root.join("lib/README")).unwrap(), "no newline");
    }

    #[test]
    fn test_no_actions_is_a_configuration_error() {
        let (_dir, root) = setup_tree();
        let before = snapshot(&root);

        let result = load_traversal_config(
            None,
            CliOptions {
                paths: vec![root.clone()],
                ..CliOptions::default()
            },
        );

        assert!(result.is_err());
        assert_eq!(snapshot(&root), before);
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("fixsrc.toml");
        fs::write(&config_path, "actions = [\"frobnicate\"]\n").unwrap();

        let err = load_traversal_config(Some(config_path), options(vec![dir.path().to_path_buf()]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
