use std::rc::Rc;

use serde::Serialize;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::info;
use tracing_subscriber::EnvFilter;

use harvest_tasks::impls::{ConsoleMessages, InMemoryIndicators, StaticSprites};
use harvest_tasks::integration::{CompatibleProgress, CompatibleTask};
use harvest_tasks::ports::{ScreenPos, SystemClock};
use harvest_tasks::{PresentationServices, TaskSystem, TaskSystemConfig};

/// 1 フレームの長さ（シミュレーション）
const FRAME: Duration = Duration::from_millis(120);

/// 台本の 1 ステップ。1 フレームに 1 つずつ実行する
#[derive(Debug, Clone, Copy)]
enum Step {
    Scene(&'static str),
    Interact(&'static str, Option<&'static str>),
    NextAction(&'static str),
    ToggleMenu,
}

const SCRIPT: &[Step] = &[
    Step::Scene("farm"),
    Step::Interact("cow1", Some("feed")),
    Step::Interact("cow1", Some("feed")),
    Step::Interact("cow1", None),
    Step::Scene("cow-shed"),
    Step::NextAction("cowBaby"),
    Step::NextAction("cowBaby"),
    Step::Interact("cowBaby", Some("pet")),
    Step::Interact("pig1", Some("feed")),
    Step::ToggleMenu,
    Step::Scene("chicken-coop"),
    Step::Interact("chicken1", None),
    Step::Interact("chicken1", None),
    Step::Interact("chicken2", Some("talk")),
    Step::ToggleMenu,
];

#[derive(Debug, Serialize)]
struct SessionSummary {
    progress: CompatibleProgress,
    remaining: Vec<CompatibleTask>,
    completed: Vec<String>,
}

fn sprites() -> StaticSprites {
    let layout = [
        ("cow1", 120.0, 300.0),
        ("cow2", 180.0, 300.0),
        ("cow3", 240.0, 300.0),
        ("cowBaby", 300.0, 320.0),
        ("chicken1", 520.0, 280.0),
        ("chicken2", 560.0, 280.0),
        ("chicken3", 600.0, 280.0),
        ("chicken4", 640.0, 280.0),
    ];
    layout
        .into_iter()
        .fold(StaticSprites::new(), |sprites, (id, x, y)| {
            sprites.with(id, ScreenPos::new(x, y))
        })
}

fn play(system: &mut TaskSystem, step: Step) {
    match step {
        Step::Scene(scene) => system.update_scene(scene),
        Step::Interact(animal, action) => {
            system.handle_animal_interaction(animal, action);
        }
        Step::NextAction(animal) => {
            system.handle_animal_task(animal);
        }
        Step::ToggleMenu => {
            let open = system.toggle_task_menu();
            info!(open, "task menu toggled");
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // (A) presentation services を用意（描画の代わりにコンソールと in-memory）
    let indicators = Rc::new(InMemoryIndicators::new());
    let services = PresentationServices {
        sprites: Rc::new(sprites()),
        messages: Rc::new(ConsoleMessages::new()),
        indicators: indicators.clone(),
    };

    // (B) TaskSystem を起動（starter タスクを読み込む）
    let mut system = TaskSystem::new(TaskSystemConfig::default(), Rc::new(SystemClock), services)?;
    println!(
        "session {} started with {} tasks",
        system.registry().session_id(),
        system.registry().active_tasks().len()
    );

    // (C) 台本を 1 フレーム 1 ステップで再生
    let mut frames = interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
    for (frame, step) in SCRIPT.iter().enumerate() {
        frames.tick().await;
        play(&mut system, *step);
        let progress = system.progress();
        println!(
            "frame {frame:>2}: {step:?} -> {}% ({} done, {} active, {} indicators)",
            progress.percentage,
            progress.completed,
            progress.active,
            indicators.len()
        );
    }

    // (D) 最終状態を JSON で出す
    let summary = SessionSummary {
        progress: system.compatible_progress(),
        remaining: system.compatible_active_tasks(),
        completed: system
            .registry()
            .completed_tasks()
            .iter()
            .map(|task| task.id().to_string())
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    system.destroy();
    Ok(())
}
