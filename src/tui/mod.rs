use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    widgets::{Block, Borders, Paragraph},
};
use std::io;
use std::path::Path;

use twin_paradox::relativity::lorentz_factor;
use twin_paradox::relativity::special::length_contraction;
use twin_paradox::{DiagramStyle, RenderMode, Scene, SceneParams, compose};

use crate::{metrics, render};

const DIAGRAM_PATH: &str = "twin_paradox.png";
const MARKERS_PATH: &str = "markers.csv";

/// Speed is kept in hundredths of c so stepping never drifts.
struct State {
    speed_percent: u32,
    params: SceneParams,
}

impl State {
    fn new(params: SceneParams) -> Self {
        let speed_percent = ((params.speed * 100.0).round() as u32).clamp(1, 99);
        Self {
            speed_percent,
            params,
        }
    }

    fn params(&self) -> SceneParams {
        SceneParams {
            speed: self.speed_percent as f64 / 100.0,
            ..self.params
        }
    }
}

pub fn start(params: SceneParams) -> anyhow::Result<()> {
    // Setup terminal
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    crossterm::terminal::enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = State::new(params);
    let outcome = run(&mut terminal, &mut state);

    crossterm::terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    outcome?;

    let scene = Scene::new(state.params())?;
    let diagrams = compose(&scene, RenderMode::Combined, &DiagramStyle::default())?;
    render::render(&diagrams, Path::new(DIAGRAM_PATH))?;
    metrics::export_csv(&scene, Path::new(MARKERS_PATH))?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut State,
) -> anyhow::Result<()> {
    loop {
        let lines = summary(&state.params());
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(2)
                .constraints(vec![Constraint::Length(3); lines.len() + 1])
                .split(f.area());

            for (i, text) in lines.iter().enumerate() {
                let block = Paragraph::new(text.as_str()).block(Block::default().borders(Borders::ALL));
                f.render_widget(block, chunks[i]);
            }
            let help = Paragraph::new("←/→ speed  ↑/↓ distance  q render & quit")
                .block(Block::default().borders(Borders::ALL).title("keys"));
            f.render_widget(help, chunks[lines.len()]);
        })?;

        // Input handling
        if event::poll(std::time::Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Right if state.speed_percent < 99 => state.speed_percent += 1,
                    KeyCode::Left if state.speed_percent > 1 => state.speed_percent -= 1,
                    KeyCode::Up => state.params.distance += 1.0,
                    KeyCode::Down if state.params.distance > 1.0 => state.params.distance -= 1.0,
                    KeyCode::Char('q') => return Ok(()),
                    _ => {}
                }
            }
        }
    }
}

fn summary(params: &SceneParams) -> Vec<String> {
    let scene = match Scene::new(*params) {
        Ok(scene) => scene,
        Err(err) => return vec![format!("Invalid parameters: {err}")],
    };
    let gamma = lorentz_factor(params.speed).unwrap_or(f64::NAN);
    let contracted = length_contraction(params.distance, params.speed).unwrap_or(f64::NAN);
    vec![
        format!(
            "Distance: {:.1} ly | Velocity: {:.2}c | Lorentz factor (γ): {:.4}",
            params.distance, params.speed, gamma
        ),
        format!(
            "Turnaround: t = {:.2} y on Earth, traveler age {:.2} y",
            scene.t_planet(),
            scene.turnaround_age()
        ),
        format!(
            "Reunion: Earth age {:.2} y | traveler age {:.2} y",
            scene.t_reunion(),
            scene.reunion_age()
        ),
        format!(
            "Earth seen at {:.2} ly (contracted {:.2} ly), receding at {:.2}c",
            scene.apparent_earth_distance(),
            contracted,
            scene.apparent_earth_speed()
        ),
        format!(
            "Simultaneity jump at turnaround: Earth time {:.2} y -> {:.2} y (+{:.2} y)",
            scene.earth_at_turnaround(twin_paradox::LegKind::Outbound).t,
            scene.earth_at_turnaround(twin_paradox::LegKind::Return).t,
            scene.simultaneity_jump()
        ),
    ]
}
