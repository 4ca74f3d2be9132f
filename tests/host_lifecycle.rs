use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::anyhow;
use minihub::core::error::HostError;
use minihub::core::input::Direction;
use minihub::core::prefs::{Preferences, Theme};
use minihub::core::registry::{Category, GameDescriptor, GameRegistry};
use minihub::core::storage::{FileStore, Storage};
use minihub::{GameHost, HostContext, HostState, InitResult, ScoreReporter, ScoreStore, ScoreValue, Teardown};

type Log = Rc<RefCell<Vec<String>>>;

fn descriptor(id: &'static str, factory: impl Fn(&HostContext, ScoreReporter) -> InitResult + 'static) -> GameDescriptor {
    GameDescriptor {
        id,
        name: id,
        description: "test game",
        category: Category::Quick,
        factory: Rc::new(factory),
    }
}

/// A game that binds directions, registers a resume hook and runs a timer,
/// logging everything it receives under its own id.
fn tracked(id: &'static str, log: &Log) -> GameDescriptor {
    let log = Rc::clone(log);
    descriptor(id, move |ctx, _report| {
        let keys = Rc::clone(&log);
        ctx.input.bind(move |d| keys.borrow_mut().push(format!("{id}:{d}")));
        let hooks = Rc::clone(&log);
        ctx.pause
            .register_resume_hook(move || hooks.borrow_mut().push(format!("{id}:resume")));
        let ticks = Rc::clone(&log);
        ctx.scheduler
            .every(Duration::from_millis(10), move || ticks.borrow_mut().push(format!("{id}:tick")));
        ctx.mount.set_lines(vec![id.to_string()]);
        Ok(None)
    })
}

fn host_with(games: Vec<GameDescriptor>) -> GameHost {
    let registry = GameRegistry::new(games).unwrap();
    GameHost::new(
        Rc::new(registry),
        ScoreStore::shared(Storage::in_memory()),
        HostContext::default(),
    )
}

#[test]
fn only_the_latest_game_is_wired() {
    let log: Log = Rc::default();
    let mut host = host_with(vec![tracked("a", &log), tracked("b", &log), tracked("c", &log)]);
    let ctx = host.context().clone();

    for id in ["a", "b", "c"] {
        host.open(id).unwrap();
        log.borrow_mut().clear();

        assert!(ctx.input.is_bound());
        assert!(ctx.input.dispatch(Direction::Up));
        ctx.pause.toggle();
        ctx.pause.toggle();

        assert_eq!(*log.borrow(), vec![format!("{id}:up"), format!("{id}:resume")]);
        assert_eq!(ctx.mount.lines(), vec![id.to_string()]);
        assert_eq!(ctx.scheduler.len(), 1);
    }
}

#[test]
fn close_releases_binding_hook_and_timers() {
    let log: Log = Rc::default();
    let mut host = host_with(vec![tracked("a", &log)]);
    let ctx = host.context().clone();
    host.open("a").unwrap();

    host.close();
    ctx.pause.toggle();
    ctx.pause.toggle();
    assert!(!ctx.input.dispatch(Direction::Left));
    assert!(ctx.scheduler.is_empty());
    assert!(ctx.mount.is_empty());
    assert!(log.borrow().is_empty());
    assert_eq!(host.state(), HostState::Idle);
}

#[test]
fn failed_init_leaves_host_idle_and_unbound() {
    let mut host = host_with(vec![descriptor("broken", |ctx, _| {
        ctx.input.bind(|_| {});
        ctx.pause.register_resume_hook(|| {});
        ctx.mount.set_lines(vec!["half drawn".into()]);
        Err(anyhow!("assets missing"))
    })]);

    let err = host.open("broken").unwrap_err();
    assert!(matches!(err, HostError::InitFailed { ref id, .. } if id == "broken"));
    assert!(err.to_string().contains("assets missing"));

    let ctx = host.context();
    assert_eq!(host.state(), HostState::Idle);
    assert!(!ctx.input.is_bound());
    assert!(!ctx.pause.has_resume_hook());
    assert!(ctx.mount.is_empty());
}

#[test]
fn failing_teardown_does_not_block_next_open() {
    let log: Log = Rc::default();
    let mut host = host_with(vec![
        descriptor("sticky", |_, _| Ok(Some(Teardown::new(|| Err(anyhow!("still busy")))))),
        tracked("a", &log),
    ]);

    host.open("sticky").unwrap();
    host.open("a").unwrap();
    assert_eq!(host.active_id(), Some("a"));
    assert!(host.context().input.dispatch(Direction::Down));
    assert_eq!(*log.borrow(), vec!["a:down".to_string()]);
}

#[test]
fn unknown_game_still_closes_the_current_one() {
    let log: Log = Rc::default();
    let mut host = host_with(vec![tracked("a", &log)]);
    host.open("a").unwrap();

    assert!(matches!(host.open("zzz"), Err(HostError::UnknownGame(id)) if id == "zzz"));
    assert_eq!(host.state(), HostState::Idle);
    assert!(!host.context().input.is_bound());
}

#[test]
fn reported_scores_keep_the_best() {
    let slot: Rc<RefCell<Option<ScoreReporter>>> = Rc::default();
    let capture = |slot: &Rc<RefCell<Option<ScoreReporter>>>| {
        let slot = Rc::clone(slot);
        move |_: &HostContext, report: ScoreReporter| -> InitResult {
            *slot.borrow_mut() = Some(report);
            Ok(None)
        }
    };
    let mut host = host_with(vec![
        descriptor("points", capture(&slot)),
        descriptor("duel", capture(&slot)),
    ]);
    let report = |value: ScoreValue| slot.borrow().as_ref().unwrap().report(value);

    host.open("points").unwrap();
    report(5.into());
    report(3.into());
    assert_eq!(host.scores().borrow().get("points"), Some(ScoreValue::Numeric(5.0)));
    report(9.into());
    assert_eq!(host.scores().borrow().display("points"), "9");

    host.open("duel").unwrap();
    report("Win".into());
    report("Win".into());
    assert_eq!(host.scores().borrow().display("duel"), "Win");
    report("Draw".into());
    assert_eq!(host.scores().borrow().get("duel"), Some(ScoreValue::Label("Draw".into())));
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let storage = Storage::new(FileStore::open(&path).unwrap());
        let mut scores = ScoreStore::new(storage.clone());
        assert!(scores.set("snake", 12).unwrap());
        let mut prefs = Preferences::load(storage);
        prefs.toggle_theme();
    }

    let storage = Storage::new(FileStore::open(&path).unwrap());
    assert_eq!(ScoreStore::new(storage.clone()).get("snake"), Some(ScoreValue::Numeric(12.0)));
    assert_eq!(Preferences::load(storage).theme(), Theme::Dark);
}
