use crate::runtime::Runtime;
use crate::types::NodeId;
use std::collections::HashMap;
use std::fmt;

/// Handle returned by `add_listener`, used to remove exactly that callback.
pub type ListenerId = u64;

/// Payload delivered to cue-point listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct CueEvent {
    pub name: String,
    /// The timeline that reached the cue.
    pub timeline: NodeId,
    pub frame: usize,
}

type CueCallback = Box<dyn FnMut(&CueEvent, &mut Runtime)>;

/// Name-addressed listener registry for timeline cue points.
///
/// Listeners run synchronously in registration order and receive the whole
/// [`Runtime`], so they can stop or move the timeline that reached the cue.
/// A panicking listener aborts delivery to the ones after it.
#[derive(Default)]
pub struct CuePointDispatcher {
    listeners: HashMap<String, Vec<(ListenerId, CueCallback)>>,
    next_id: ListenerId,
    in_flight: Option<InFlight>,
}

/// The list currently taken out for delivery.
struct InFlight {
    name: String,
    ids: Vec<ListenerId>,
    removed: Vec<ListenerId>,
}

impl fmt::Debug for CuePointDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .listeners
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("CuePointDispatcher")
            .field("listeners", &counts)
            .finish()
    }
}

impl CuePointDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &mut self,
        name: &str,
        callback: impl FnMut(&CueEvent, &mut Runtime) + 'static,
    ) -> ListenerId {
        self.next_id += 1;
        let id = self.next_id;
        self.listeners
            .entry(name.to_string())
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Removes one callback. Other callbacks on the same cue are kept.
    ///
    /// Called from inside a delivery of `name`, the removal is applied once
    /// that delivery finishes.
    pub fn remove_listener(&mut self, name: &str, id: ListenerId) -> bool {
        if let Some(list) = self.listeners.get_mut(name) {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                list.remove(pos);
                if list.is_empty() {
                    self.listeners.remove(name);
                }
                return true;
            }
        }
        match self.in_flight.as_mut() {
            Some(f) if f.name == name && f.ids.contains(&id) && !f.removed.contains(&id) => {
                f.removed.push(id);
                true
            }
            _ => false,
        }
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, |l| l.len())
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

/// Invokes every listener registered for `event.name`. Returns how many ran.
///
/// The listener list is taken out of the dispatcher for the duration of the
/// call. Listeners added meanwhile run from the next trigger on.
pub fn trigger(rt: &mut Runtime, event: &CueEvent) -> usize {
    let name = event.name.as_str();
    let Some(mut list) = rt.cues.listeners.remove(name) else {
        return 0;
    };
    let outer = rt.cues.in_flight.replace(InFlight {
        name: name.to_string(),
        ids: list.iter().map(|(id, _)| *id).collect(),
        removed: Vec::new(),
    });

    let mut ran = 0;
    for (id, callback) in list.iter_mut() {
        let removed = rt.cues.in_flight.as_ref().is_some_and(|f| f.removed.contains(id));
        if !removed {
            callback(event, rt);
            ran += 1;
        }
    }

    let removed = std::mem::replace(&mut rt.cues.in_flight, outer).map_or_else(Vec::new, |f| f.removed);
    list.retain(|(id, _)| !removed.contains(id));
    if let Some(added) = rt.cues.listeners.remove(name) {
        list.extend(added);
    }
    if !list.is_empty() {
        rt.cues.listeners.insert(name.to_string(), list);
    }
    ran
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn event(name: &str) -> CueEvent {
        CueEvent {
            name: name.to_string(),
            timeline: 0,
            frame: 2,
        }
    }

    #[test]
    fn test_trigger_in_registration_order() {
        let mut rt = Runtime::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let log = log.clone();
            rt.cues.add_listener("boom", move |_, _| log.borrow_mut().push(tag));
        }
        assert_eq!(trigger(&mut rt, &event("boom")), 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
        assert_eq!(trigger(&mut rt, &event("quiet")), 0);
    }

    #[test]
    fn test_remove_only_the_given_listener() {
        let mut rt = Runtime::default();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let h1 = hits.clone();
        let a = rt.cues.add_listener("boom", move |_, _| h1.borrow_mut().push("a"));
        let h2 = hits.clone();
        rt.cues.add_listener("boom", move |_, _| h2.borrow_mut().push("b"));

        assert!(rt.cues.remove_listener("boom", a));
        assert!(!rt.cues.remove_listener("boom", a));
        trigger(&mut rt, &event("boom"));
        assert_eq!(*hits.borrow(), vec!["b"]);
        assert_eq!(rt.cues.listener_count("boom"), 1);
    }

    #[test]
    fn test_listeners_can_edit_the_registry_during_delivery() {
        let mut rt = Runtime::default();
        let hits = Rc::new(RefCell::new(Vec::new()));

        let h = hits.clone();
        let once = Rc::new(Cell::new(0));
        let own_id = once.clone();
        let first = rt.cues.add_listener("boom", move |event, rt| {
            h.borrow_mut().push("once");
            assert!(rt.cues.remove_listener(&event.name, own_id.get()));
            let late = h.clone();
            rt.cues.add_listener("boom", move |_, _| late.borrow_mut().push("late"));
        });
        once.set(first);
        let h = hits.clone();
        rt.cues.add_listener("boom", move |_, _| h.borrow_mut().push("steady"));

        assert_eq!(trigger(&mut rt, &event("boom")), 2);
        assert_eq!(*hits.borrow(), vec!["once", "steady"]);
        assert_eq!(rt.cues.listener_count("boom"), 2);

        hits.borrow_mut().clear();
        assert_eq!(trigger(&mut rt, &event("boom")), 2);
        assert_eq!(*hits.borrow(), vec!["steady", "late"]);
    }
}
