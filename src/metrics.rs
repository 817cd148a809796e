use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use twin_paradox::{MarkerKind, Scene};

/// One age marker, flattened for CSV.
#[derive(Debug, Serialize)]
pub struct MarkerRow {
    pub leg: &'static str,
    pub age: f64,
    pub terminal: bool,
    pub traveler_x: f64,
    pub traveler_t: f64,
    pub earth_t: f64,
}

pub fn marker_rows(scene: &Scene) -> Vec<MarkerRow> {
    scene
        .markers()
        .iter()
        .map(|m| MarkerRow {
            leg: m.leg.label(),
            age: m.age,
            terminal: m.kind == MarkerKind::Terminal,
            traveler_x: m.traveler.x,
            traveler_t: m.traveler.t,
            earth_t: m.earth.t,
        })
        .collect()
}

pub fn write_csv<W: Write>(scene: &Scene, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for row in marker_rows(scene) {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

pub fn export_csv(scene: &Scene, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(scene, file)?;
    info!("✅ Markers exported to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_paradox::SceneParams;

    #[test]
    fn csv_has_header_and_one_row_per_marker() {
        let scene = Scene::new(SceneParams::default()).unwrap();
        let mut buf = Vec::new();
        write_csv(&scene, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "leg,age,terminal,traveler_x,traveler_t,earth_t");
        assert_eq!(lines.len(), 1 + scene.markers().len());
        assert!(lines[1].starts_with("outbound,2.0,false,"));
    }

    #[test]
    fn terminal_rows_are_flagged() {
        let scene = Scene::new(SceneParams::default()).unwrap();
        let terminals = marker_rows(&scene).iter().filter(|r| r.terminal).count();
        assert_eq!(terminals, 2);
    }
}
