pub mod error;
pub mod manifest;
pub mod scaffold;

pub use error::ProjectError;
pub use manifest::{MANIFEST_FILE, Project, ProjectSection, ProjectSettings, RuntimeSection};
pub use scaffold::{
    DEFAULT_MAIN_DOCUMENT, create_new_project, default_main_document, default_manifest,
};

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn parses_full_manifest() {
        let settings = ProjectSettings::from_toml_str(
            r#"
            [project]
            name = "Demo"
            main_document = "main.goml"

            [runtime]
            fps = 30.0
            frames = 10
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(settings.project.name, "Demo");
        assert_eq!(settings.runtime.fps, 30.0);
        assert_eq!(settings.runtime.frames, 10);
        assert_eq!(settings.runtime.log_level, "debug");
    }

    #[test]
    fn runtime_section_defaults() {
        let settings = ProjectSettings::from_toml_str(
            "[project]\nname = \"Demo\"\nmain_document = \"main.goml\"\n",
        )
        .unwrap();
        assert_eq!(settings.runtime, RuntimeSection::default());
        assert_eq!(settings.runtime.fps, 60.0);
        assert_eq!(settings.runtime.frames, 120);
    }

    #[test]
    fn partial_runtime_section_fills_defaults() {
        let settings = ProjectSettings::from_toml_str(
            "[project]\nname = \"Demo\"\nmain_document = \"a.goml\"\n[runtime]\nframes = 3\n",
        )
        .unwrap();
        assert_eq!(settings.runtime.frames, 3);
        assert_eq!(settings.runtime.log_level, "info");
    }

    #[test]
    fn rejects_missing_project_and_bad_fps() {
        assert!(matches!(
            ProjectSettings::from_toml_str("[runtime]\nfps = 60.0\n"),
            Err(ProjectError::Toml(_))
        ));
        assert!(matches!(
            ProjectSettings::from_toml_str(
                "[project]\nname = \"x\"\nmain_document = \"m.goml\"\n[runtime]\nfps = 0.0\n"
            ),
            Err(ProjectError::Invalid(_))
        ));
    }

    #[test]
    fn main_document_resolves_against_root() {
        let settings = ProjectSettings::from_toml_str(
            "[project]\nname = \"x\"\nmain_document = \"scenes/main.goml\"\n",
        )
        .unwrap();
        let project = Project::from_settings("/tmp/demo", settings);
        assert_eq!(
            project.main_document_path(),
            PathBuf::from("/tmp/demo/scenes/main.goml")
        );
    }

    #[test]
    fn default_manifest_round_trips() {
        let settings = ProjectSettings::from_toml_str(&default_manifest("My \"Game\"")).unwrap();
        assert_eq!(settings.project.name, "My \"Game\"");
        assert_eq!(settings.project.main_document, DEFAULT_MAIN_DOCUMENT);
        assert_eq!(settings.runtime, RuntimeSection::default());
    }

    #[test]
    fn new_project_is_loadable_and_not_overwritten() {
        let dir = std::env::temp_dir().join(format!("goml_project_new_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();

        create_new_project(&dir, "Demo").unwrap();
        let project = Project::load(&dir).unwrap();
        assert_eq!(project.name(), "Demo");
        assert_eq!(project.read_main_document().unwrap(), default_main_document());

        assert!(matches!(
            create_new_project(&dir, "Demo"),
            Err(ProjectError::AlreadyExists(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_manifest_is_io_error() {
        let dir = std::env::temp_dir().join("goml_project_missing_manifest_test");
        assert!(matches!(Project::load(&dir), Err(ProjectError::Io { .. })));
    }
}
