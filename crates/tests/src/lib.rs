//! # Integration Tests
//!
//! End-to-end runs across crates.
//!
//! Covers:
//! - Pre-scale then reconstruct against the mock runner
//! - Workspace-level guarantees (no mutation on bad input, no rollback)
//! - Configuration driving the pipeline

#[cfg(test)]
mod contract_tests {
    use contracts::{ErrorKind, ARTIFACT_FILES, IMAGES_BACKUP_DIR, SUPPORTED_IMAGE_EXTENSIONS};

    #[test]
    fn test_layout_constants() {
        assert_eq!(ARTIFACT_FILES, ["cameras.bin", "images.bin", "points3D.bin"]);
        assert_eq!(IMAGES_BACKUP_DIR, "images_original");
        assert!(!SUPPORTED_IMAGE_EXTENSIONS.contains(&"svg"));
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../colmap-runner.example.toml");
        let blueprint = config_loader::ConfigLoader::load_from_path(&path).unwrap();
        assert_eq!(blueprint.tools.colmap, "colmap");
        assert!(!blueprint.pipeline.lock_workspace);
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(ErrorKind::MissingInput.as_str(), "MissingInputError");
        assert_eq!(ErrorKind::Conflict.as_str(), "ConflictError");
        assert_eq!(ErrorKind::InvalidMode.as_str(), "InvalidModeError");
        assert_eq!(ErrorKind::ExternalProcess.as_str(), "ExternalProcessError");
        assert_eq!(ErrorKind::Verification.as_str(), "VerificationError");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::path::Path;

    use contracts::{
        ErrorKind, MatchingMode, PipelineState, RunLog, ScalingMode, UnscaledPolicy, Workspace,
    };
    use prescaler::Prescaler;
    use reconstruction::Orchestrator;
    use tool_runner::{MockConfig, MockRunner};

    fn workspace(files: &[&str]) -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        std::fs::create_dir_all(ws.images_dir()).unwrap();
        for name in files {
            std::fs::write(ws.images_dir().join(name), name.as_bytes()).unwrap();
        }
        (dir, ws)
    }

    /// Snapshot of every file under `root` with its content
    fn tree(root: &Path) -> Vec<(String, Vec<u8>)> {
        let mut out = Vec::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    let rel = path.strip_prefix(root).unwrap().display().to_string();
                    out.push((rel, std::fs::read(&path).unwrap()));
                }
            }
        }
        out.sort();
        out
    }

    /// End-to-end: Prescaler -> Orchestrator on one shared runner
    #[tokio::test]
    async fn test_e2e_prescale_and_reconstruct() {
        let (_dir, ws) = workspace(&["0001.jpg", "0002.jpg", "0003.png", "readme.txt"]);
        let runner = MockRunner::new();

        let prescale = Prescaler::new(&runner, "convert")
            .run(&ws, ScalingMode::Quarter)
            .await;
        let summary = prescale.result.unwrap().unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.skipped, 1);

        let report = Orchestrator::new(&runner, "colmap")
            .run(&ws, MatchingMode::Sequential)
            .await;
        assert!(report.is_success(), "log:\n{}", report.log);
        assert_eq!(report.reached, PipelineState::Verified);

        let mut log = RunLog::new();
        log.extend(prescale.log);
        log.extend(report.log);
        assert!(log.contains(&ws.result_dir().display().to_string()));

        let subcommands = runner.subcommands();
        assert_eq!(subcommands.len(), 7);
        assert_eq!(
            &subcommands[3..],
            ["database_creator", "feature_extractor", "sequential_matcher", "mapper"]
        );

        // Originals untouched
        assert_eq!(
            std::fs::read(ws.images_backup_dir().join("0001.jpg")).unwrap(),
            b"0001.jpg"
        );
    }

    #[tokio::test]
    async fn test_missing_images_mutates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"keep").unwrap();
        let ws = Workspace::new(dir.path());
        let before = tree(dir.path());
        let runner = MockRunner::new();

        let prescale = Prescaler::new(&runner, "convert")
            .run(&ws, ScalingMode::Half)
            .await;
        let report = Orchestrator::new(&runner, "colmap")
            .run(&ws, MatchingMode::Exhaustive)
            .await;

        assert_eq!(
            prescale.error().map(|e| e.kind()),
            Some(ErrorKind::MissingInput)
        );
        assert_eq!(report.error().map(|e| e.kind()), Some(ErrorKind::MissingInput));
        assert_eq!(tree(dir.path()), before);
        assert_eq!(runner.invocation_count(), 0);
    }

    #[tokio::test]
    async fn test_no_scaling_leaves_images_byte_identical() {
        let (dir, ws) = workspace(&["a.jpg", "b.jpg"]);
        let before = tree(dir.path());

        let report = Prescaler::new(MockRunner::new(), "convert")
            .run(&ws, ScalingMode::NoScaling)
            .await;

        assert!(report.is_success());
        assert_eq!(tree(dir.path()), before);
        assert!(!ws.images_backup_dir().exists());
    }

    #[tokio::test]
    async fn test_conflict_leaves_both_directories() {
        let (dir, ws) = workspace(&["a.jpg"]);
        std::fs::create_dir_all(ws.images_backup_dir()).unwrap();
        std::fs::write(ws.images_backup_dir().join("old.jpg"), b"old").unwrap();
        let before = tree(dir.path());

        for mode in [
            ScalingMode::Half,
            ScalingMode::Quarter,
            ScalingMode::Eighth,
            ScalingMode::LongestEdge1600,
        ] {
            let report = Prescaler::new(MockRunner::new(), "convert")
                .run(&ws, mode)
                .await;
            assert_eq!(report.error().map(|e| e.kind()), Some(ErrorKind::Conflict));
        }
        assert_eq!(tree(dir.path()), before);
    }

    #[tokio::test]
    async fn test_matcher_failure_reports_stage_and_stderr() {
        let (_dir, ws) = workspace(&["a.jpg", "b.jpg"]);
        let runner = MockRunner::with_config(MockConfig {
            fail_on: vec!["exhaustive_matcher".into()],
            failure_stderr: "SIFT GPU context unavailable".into(),
            ..Default::default()
        });

        let report = Orchestrator::new(&runner, "colmap")
            .run(&ws, MatchingMode::Exhaustive)
            .await;

        assert!(report.log.contains("Running Exhaustive matching"));
        assert!(report.log.contains("SIFT GPU context unavailable"));
        assert!(!runner.subcommands().iter().any(|s| s == "mapper"));
        assert!(!ws.result_dir().exists());
    }

    #[tokio::test]
    async fn test_partial_prescale_then_retry_conflicts() {
        let (_dir, ws) = workspace(&["a.jpg", "b.jpg", "c.jpg"]);

        let failed = Prescaler::new(MockRunner::failing_on("c.jpg"), "convert")
            .run(&ws, ScalingMode::Half)
            .await;
        assert_eq!(
            failed.error().map(|e| e.kind()),
            Some(ErrorKind::ExternalProcess)
        );
        assert!(ws.images_dir().join("a.jpg").is_file());
        assert!(ws.images_dir().join("b.jpg").is_file());
        assert!(!ws.images_dir().join("c.jpg").exists());

        // The backup is still there, so a second attempt must not clobber it
        let retry = Prescaler::new(MockRunner::new(), "convert")
            .run(&ws, ScalingMode::Half)
            .await;
        assert_eq!(retry.error().map(|e| e.kind()), Some(ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_longest_edge_policies_feed_reconstruction() {
        let (_dir, ws) = workspace(&[]);
        image::RgbImage::new(32, 32)
            .save(ws.images_dir().join("small.png"))
            .unwrap();
        image::RgbImage::new(2000, 20)
            .save(ws.images_dir().join("large.png"))
            .unwrap();
        let runner = MockRunner::new();

        let prescale = Prescaler::new(&runner, "convert")
            .with_unscaled_policy(UnscaledPolicy::Omit)
            .run(&ws, ScalingMode::LongestEdge1600)
            .await;
        let summary = prescale.result.unwrap().unwrap();
        assert_eq!((summary.processed, summary.omitted), (1, 1));

        let report = Orchestrator::new(&runner, "colmap")
            .run(&ws, MatchingMode::Spatial)
            .await;
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_config_drives_tools_and_defaults() {
        let (_dir, ws) = workspace(&["a.jpg"]);
        let blueprint = config_loader::ConfigLoader::load_from_str(
            r#"
            [tools]
            colmap = "/opt/colmap/bin/colmap"
            convert = "magick"

            [pipeline]
            matching = "spatial"

            [prescale]
            scaling = "half"
            "#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        let runner = MockRunner::new();

        let prescale = Prescaler::from_blueprint(&runner, &blueprint)
            .run(&ws, blueprint.prescale.scaling)
            .await;
        assert!(prescale.is_success());

        let report = Orchestrator::from_blueprint(&runner, &blueprint)
            .run(&ws, blueprint.pipeline.matching)
            .await;
        assert!(report.is_success());

        let calls = runner.invocations();
        assert_eq!(calls[0].program(), "magick");
        assert_eq!(calls[1].program(), "/opt/colmap/bin/colmap");
        assert_eq!(calls[3].subcommand(), Some("spatial_matcher"));

        observability::record_prescale_report(&prescale);
        observability::record_pipeline_report(&report);
    }
}
