//! EventHub - 同期 publish/subscribe
//!
//! - イベント種別ごとに登録順でリスナーを呼ぶ
//! - once リスナーは dispatch パスの後に取り除く
//! - リスナーの Err はログに出して握りつぶす（他のリスナーと emit 元は止めない）
//! - ディスパッチ中の on / off / emit は安全（テーブルの借用を持ったまま呼ばない）
//!
//! 単一スレッド・同期前提なので `Rc<RefCell<_>>` で共有する。`EventHub` は
//! ハンドルで、clone しても同じテーブルを指す。

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::error;

/// An event that can be routed by its kind.
pub trait HubEvent {
    type Kind: Copy + Ord + fmt::Display;

    fn kind(&self) -> Self::Kind;
}

pub type ListenerError = Box<dyn std::error::Error>;
pub type ListenerResult = Result<(), ListenerError>;

/// Handle returned by `on` / `once`, used to `off` a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Outcome of one `emit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

struct Listener<E> {
    id: ListenerId,
    once: bool,
    fired: Cell<bool>,
    callback: Box<dyn Fn(&E) -> ListenerResult>,
}

struct ListenerTable<E: HubEvent> {
    listeners: BTreeMap<E::Kind, Vec<Rc<Listener<E>>>>,
    next_id: u64,
}

pub struct EventHub<E: HubEvent> {
    inner: Rc<RefCell<ListenerTable<E>>>,
}

impl<E: HubEvent> Clone for EventHub<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: HubEvent> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: HubEvent> EventHub<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListenerTable {
                listeners: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Register a persistent listener.
    pub fn on<F>(&self, kind: E::Kind, callback: F) -> ListenerId
    where
        F: Fn(&E) -> ListenerResult + 'static,
    {
        self.add(kind, Box::new(callback), false)
    }

    /// Register a listener that is removed after its first invocation.
    pub fn once<F>(&self, kind: E::Kind, callback: F) -> ListenerId
    where
        F: Fn(&E) -> ListenerResult + 'static,
    {
        self.add(kind, Box::new(callback), true)
    }

    fn add(
        &self,
        kind: E::Kind,
        callback: Box<dyn Fn(&E) -> ListenerResult>,
        once: bool,
    ) -> ListenerId {
        let mut table = self.inner.borrow_mut();
        let id = ListenerId(table.next_id);
        table.next_id += 1;
        table.listeners.entry(kind).or_default().push(Rc::new(Listener {
            id,
            once,
            fired: Cell::new(false),
            callback,
        }));
        id
    }

    /// Remove a listener. Returns false if it was not registered for `kind`.
    pub fn off(&self, kind: E::Kind, id: ListenerId) -> bool {
        let mut table = self.inner.borrow_mut();
        let Some(list) = table.listeners.get_mut(&kind) else {
            return false;
        };
        let Some(index) = list.iter().position(|l| l.id == id) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            table.listeners.remove(&kind);
        }
        true
    }

    /// Synchronously invoke every listener registered for the event's kind.
    ///
    /// Listeners added during the pass run from the next emit on. Listeners
    /// removed during the pass are skipped.
    pub fn emit(&self, event: &E) -> DispatchReport {
        let kind = event.kind();
        let snapshot: Vec<Rc<Listener<E>>> = {
            let table = self.inner.borrow();
            match table.listeners.get(&kind) {
                Some(list) => list.iter().cloned().collect(),
                None => return DispatchReport::default(),
            }
        };

        let mut report = DispatchReport::default();
        let mut fired_once = false;
        for listener in snapshot {
            if !self.is_registered(kind, listener.id) {
                continue;
            }
            if listener.once {
                // ネストした emit で二重に呼ばれないように先に印を付ける
                if listener.fired.replace(true) {
                    continue;
                }
                fired_once = true;
            }
            report.delivered += 1;
            if let Err(err) = (listener.callback)(event) {
                report.failed += 1;
                error!(event = %kind, listener = %listener.id, error = %err, "error in task event listener");
            }
        }

        if fired_once {
            let mut table = self.inner.borrow_mut();
            if let Some(list) = table.listeners.get_mut(&kind) {
                list.retain(|l| !(l.once && l.fired.get()));
                if list.is_empty() {
                    table.listeners.remove(&kind);
                }
            }
        }
        report
    }

    /// Clear listeners for one kind, or for every kind when `None`.
    pub fn remove_all_listeners(&self, kind: Option<E::Kind>) {
        let mut table = self.inner.borrow_mut();
        match kind {
            Some(kind) => {
                table.listeners.remove(&kind);
            }
            None => table.listeners.clear(),
        }
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .map_or(0, |list| list.len())
    }

    pub fn has_listeners(&self, kind: E::Kind) -> bool {
        self.listener_count(kind) > 0
    }

    /// Kinds that currently have at least one listener.
    pub fn event_names(&self) -> Vec<E::Kind> {
        self.inner.borrow().listeners.keys().copied().collect()
    }

    fn is_registered(&self, kind: E::Kind, id: ListenerId) -> bool {
        self.inner
            .borrow()
            .listeners
            .get(&kind)
            .is_some_and(|list| list.iter().any(|l| l.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Kind {
        Ping,
        Pong,
    }

    impl fmt::Display for Kind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{self:?}")
        }
    }

    #[derive(Debug)]
    struct Ev(Kind, u32);

    impl HubEvent for Ev {
        type Kind = Kind;
        fn kind(&self) -> Kind {
            self.0
        }
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&Ev) -> ListenerResult>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log2 = Rc::clone(&log);
        let make = move |name: &str| -> Box<dyn Fn(&Ev) -> ListenerResult> {
            let log = Rc::clone(&log2);
            let name = name.to_string();
            Box::new(move |ev: &Ev| {
                log.borrow_mut().push(format!("{name}:{}", ev.1));
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let hub = EventHub::<Ev>::new();
        let (log, make) = recorder();
        hub.on(Kind::Ping, make("a"));
        hub.on(Kind::Ping, make("b"));
        hub.on(Kind::Pong, make("c"));

        let report = hub.emit(&Ev(Kind::Ping, 1));

        assert_eq!(report, DispatchReport { delivered: 2, failed: 0 });
        assert_eq!(*log.borrow(), vec!["a:1", "b:1"]);
    }

    #[test]
    fn once_listener_runs_only_once() {
        let hub = EventHub::<Ev>::new();
        let (log, make) = recorder();
        hub.once(Kind::Ping, make("once"));
        hub.on(Kind::Ping, make("always"));

        hub.emit(&Ev(Kind::Ping, 1));
        hub.emit(&Ev(Kind::Ping, 2));

        assert_eq!(*log.borrow(), vec!["once:1", "always:1", "always:2"]);
        assert_eq!(hub.listener_count(Kind::Ping), 1);
    }

    #[test]
    fn failing_listener_does_not_stop_the_others() {
        let hub = EventHub::<Ev>::new();
        let (log, make) = recorder();
        hub.on(Kind::Ping, make("first"));
        hub.on(Kind::Ping, |_| Err("boom".into()));
        hub.on(Kind::Ping, make("third"));

        let report = hub.emit(&Ev(Kind::Ping, 7));

        assert_eq!(report, DispatchReport { delivered: 3, failed: 1 });
        assert_eq!(*log.borrow(), vec!["first:7", "third:7"]);
    }

    #[test]
    fn off_removes_only_the_given_listener() {
        let hub = EventHub::<Ev>::new();
        let (log, make) = recorder();
        let a = hub.on(Kind::Ping, make("a"));
        hub.on(Kind::Ping, make("b"));

        assert!(hub.off(Kind::Ping, a));
        assert!(!hub.off(Kind::Ping, a));
        assert!(!hub.off(Kind::Pong, a));

        hub.emit(&Ev(Kind::Ping, 1));
        assert_eq!(*log.borrow(), vec!["b:1"]);
    }

    #[test]
    fn listener_can_remove_a_later_listener_during_dispatch() {
        let hub = EventHub::<Ev>::new();
        let (log, make) = recorder();
        let victim = Rc::new(Cell::new(None));

        let hub2 = hub.clone();
        let victim2 = Rc::clone(&victim);
        hub.on(Kind::Ping, move |_| {
            if let Some(id) = victim2.get() {
                hub2.off(Kind::Ping, id);
            }
            Ok(())
        });
        victim.set(Some(hub.on(Kind::Ping, make("victim"))));
        hub.on(Kind::Ping, make("bystander"));

        hub.emit(&Ev(Kind::Ping, 1));

        assert_eq!(*log.borrow(), vec!["bystander:1"]);
        assert_eq!(hub.listener_count(Kind::Ping), 2);
    }

    #[test]
    fn listener_added_during_dispatch_runs_next_time() {
        let hub = EventHub::<Ev>::new();
        let (log, make) = recorder();
        let make = Rc::new(make);

        let hub2 = hub.clone();
        let make2 = Rc::clone(&make);
        hub.once(Kind::Ping, move |_| {
            hub2.on(Kind::Ping, make2("late"));
            Ok(())
        });

        hub.emit(&Ev(Kind::Ping, 1));
        assert!(log.borrow().is_empty());

        hub.emit(&Ev(Kind::Ping, 2));
        assert_eq!(*log.borrow(), vec!["late:2"]);
    }

    #[test]
    fn nested_emit_does_not_refire_once_listener() {
        let hub = EventHub::<Ev>::new();
        let count = Rc::new(Cell::new(0));

        let hub2 = hub.clone();
        let count2 = Rc::clone(&count);
        hub.once(Kind::Ping, move |ev| {
            count2.set(count2.get() + 1);
            if ev.1 == 1 {
                hub2.emit(&Ev(Kind::Ping, 2));
            }
            Ok(())
        });

        hub.emit(&Ev(Kind::Ping, 1));

        assert_eq!(count.get(), 1);
        assert!(!hub.has_listeners(Kind::Ping));
    }

    #[test]
    fn remove_all_listeners_for_one_or_every_kind() {
        let hub = EventHub::<Ev>::new();
        let (_log, make) = recorder();
        hub.on(Kind::Ping, make("a"));
        hub.on(Kind::Pong, make("b"));
        assert_eq!(hub.event_names(), vec![Kind::Ping, Kind::Pong]);

        hub.remove_all_listeners(Some(Kind::Ping));
        assert_eq!(hub.event_names(), vec![Kind::Pong]);

        hub.remove_all_listeners(None);
        assert!(hub.event_names().is_empty());
        assert_eq!(hub.emit(&Ev(Kind::Pong, 1)), DispatchReport::default());
    }
}
