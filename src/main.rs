use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use lobby::clock::SystemClock;
use lobby::config::LobbyConfig;
use lobby::countdown::PersistentCountdown;
use lobby::engine::FrameLoop;
use lobby::prefs::{FilePrefs, PrefsStore};
use lobby::ui::leaderboard::LeaderboardPanel;

fn main() -> Result<()> {
    init_tracing();

    let config = LobbyConfig::load_or_default("lobby.ron");
    tracing::info!(
        target: "lobby",
        app = %config.app_name,
        fps = config.target_fps,
        "front-end starting"
    );

    let prefs = FilePrefs::open(&config.prefs_path)
        .with_context(|| format!("failed to open prefs at {}", config.prefs_path.display()))?;
    let store: Rc<RefCell<dyn PrefsStore>> = Rc::new(RefCell::new(prefs));
    let clock = Rc::new(SystemClock);

    let mut countdown = PersistentCountdown::with_policy(
        "daily_reward",
        Duration::from_secs(config.reward_cooldown_secs),
        store,
        clock,
        config.on_malformed,
    )?;

    let finished = Rc::new(Cell::new(false));
    let on_done = finished.clone();
    countdown.on_progress(|remaining| {
        print!("\rreward in {:>5.1}s", remaining.as_secs_f32());
        let _ = std::io::stdout().flush();
    });
    countdown.on_complete(move || {
        println!("\nreward ready!");
        on_done.set(true);
    });
    countdown.start(false);

    let panel = LeaderboardPanel::default();
    tracing::debug!(
        target: "lobby",
        elements = panel.elements().len(),
        "leaderboard panel bound"
    );

    let countdown = Rc::new(RefCell::new(countdown));
    let mut frame_loop = FrameLoop::new(config.target_fps);
    frame_loop.register(countdown);
    frame_loop.run_until(|| finished.get());

    tracing::info!(target: "lobby", "front-end shutdown complete");
    Ok(())
}

fn init_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}
