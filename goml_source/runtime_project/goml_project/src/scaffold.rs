use std::fs;
use std::path::Path;

use crate::error::{ProjectError, Result};
use crate::manifest::MANIFEST_FILE;

pub const DEFAULT_MAIN_DOCUMENT: &str = "main.goml";

/// Creates `project_root` with a manifest and a starter document.
pub fn create_new_project(project_root: &Path, project_name: &str) -> Result<()> {
    if project_root.exists() {
        return Err(ProjectError::AlreadyExists(project_root.to_path_buf()));
    }
    fs::create_dir_all(project_root).map_err(|source| ProjectError::Io {
        path: project_root.to_path_buf(),
        source,
    })?;
    write_if_missing(&project_root.join(MANIFEST_FILE), &default_manifest(project_name))?;
    write_if_missing(&project_root.join(DEFAULT_MAIN_DOCUMENT), default_main_document())?;
    log::info!("created project {project_name} at {}", project_root.display());
    Ok(())
}

pub fn default_manifest(name: &str) -> String {
    let name = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"[project]
name = "{name}"
main_document = "{DEFAULT_MAIN_DOCUMENT}"

[runtime]
fps = 60.0
frames = 120
log_level = "info"
"#
    )
}

pub fn default_main_document() -> &'static str {
    r##"<head>
  <scenes>
    <scene id="main">
      <cam id="camera" position=(0, 2, 8) fov=60 />
      <light init={type: "Amb", value: ["#404040"]} />
      <light init={type: "Dir", value: ["#ffffff", 1]} position=(5, 10, 5) castShadow />
      <mesh geo={type: "Box", value: [1, 1, 1]} mtl={type: "MeshStandard", value: {color: "#44aa88"}} castShadow />
    </scene>
  </scenes>
</head>
<body>
  <rdrs>
    <rdr width=1280 height=720 clearColor="#101018">
      <vps>
        <vp cam="#camera" scene="#main" />
      </vps>
    </rdr>
  </rdrs>
</body>
"##
}

fn write_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, contents).map_err(|source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    })
}
