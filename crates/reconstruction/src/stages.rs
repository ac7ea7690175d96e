//! Stage table: mode and workspace in, command descriptors out.

use contracts::{CommandSpec, MatchingMode, Stage, StageKind, Workspace};

/// The four stages in execution order
pub fn build_stages(colmap: &str, workspace: &Workspace, mode: MatchingMode) -> Vec<Stage> {
    let database = workspace.database_path();
    let images = workspace.images_dir();

    vec![
        Stage::new(
            StageKind::CreateDatabase,
            CommandSpec::new(colmap)
                .arg("database_creator")
                .flag("--database_path", &database),
        ),
        Stage::new(
            StageKind::ExtractFeatures,
            CommandSpec::new(colmap)
                .arg("feature_extractor")
                .flag("--database_path", &database)
                .flag("--image_path", &images),
        ),
        Stage::new(
            StageKind::MatchFeatures(mode),
            matcher_command(colmap, workspace, mode),
        ),
        Stage::new(
            StageKind::Reconstruct,
            CommandSpec::new(colmap)
                .arg("mapper")
                .flag("--database_path", &database)
                .flag("--image_path", &images)
                .flag("--output_path", workspace.sparse_dir()),
        ),
    ]
}

/// `<mode>_matcher --database_path <db>`
pub fn matcher_command(colmap: &str, workspace: &Workspace, mode: MatchingMode) -> CommandSpec {
    CommandSpec::new(colmap)
        .arg(mode.matcher_subcommand())
        .flag("--database_path", workspace.database_path())
}
