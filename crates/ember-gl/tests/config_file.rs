// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::Write;

use ember_gl::{
    ConfigError, ExecutionMode, GlVersion, HeadlessDevice, Renderer, RendererConfig,
};

#[test]
fn test_config_file_drives_the_renderer() -> anyhow::Result<()> {
    // --- 1. ARRANGE ---
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        "(gl_version: Gl21, execution: Some(Deferred), max_texture_units: Some(1))"
    )?;

    // --- 2. ACT ---
    let config = RendererConfig::load(file.path())?;
    let mut renderer = Renderer::inline(
        Box::new(HeadlessDevice::for_version(config.gl_version)),
        &config,
    );
    let first = renderer.create_texture_2d();
    let second = renderer.create_texture_2d();
    let shader = renderer.create_shader("void main() {}", "void main() {}");
    renderer.set_shader_texture(shader, "u_first", first);
    renderer.set_shader_texture(shader, "u_second", second);

    // --- 3. ASSERT ---
    assert_eq!(config.execution_mode(), ExecutionMode::Deferred);
    // Deferred despite GL 2.1: nothing ran yet.
    assert!(!renderer.back_frame().is_empty());

    renderer.present()?;
    let server = renderer.server();
    assert_eq!(server.max_texture_units(), 1);
    let samplers = &server.state().shaders.get(shader).unwrap().samplers;
    assert_eq!(samplers.len(), 1);
    Ok(())
}

#[test]
fn test_saved_config_loads_back() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("renderer.ron");
    let config = RendererConfig {
        anisotropy_limit: 4.0,
        ..RendererConfig::for_version(GlVersion::Gl20)
    };

    std::fs::write(&path, config.to_ron_string()?)?;

    assert_eq!(RendererConfig::load(&path)?, config);
    Ok(())
}

#[test]
fn test_missing_and_malformed_files_are_errors() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    let missing = RendererConfig::load(dir.path().join("absent.ron"));
    assert!(matches!(missing, Err(ConfigError::Io(_))));

    let path = dir.path().join("broken.ron");
    std::fs::write(&path, "(gl_version: Gl45)")?;
    assert!(matches!(
        RendererConfig::load(&path),
        Err(ConfigError::Parse(_))
    ));
    Ok(())
}
