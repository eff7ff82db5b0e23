// Copyright 2025 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notification passes that mutate the list they run over.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use sightline_observe::{ObserverId, Observers};

struct Widget {
    name: &'static str,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Widget {
    fn refresh(&self) {
        self.log.borrow_mut().push(self.name);
    }
}

#[test]
fn weak_widgets_dropped_between_passes_are_skipped() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = Rc::new(Widget {
        name: "a",
        log: log.clone(),
    });
    let b = Rc::new(Widget {
        name: "b",
        log: log.clone(),
    });

    let widgets: Observers<Weak<Widget>> = Observers::new();
    widgets.subscribe(Rc::downgrade(&a));
    widgets.subscribe(Rc::downgrade(&b));

    let deliver = |_: ObserverId, w: &Weak<Widget>| {
        if let Some(w) = w.upgrade() {
            w.refresh();
        }
    };
    widgets.notify_all(deliver);
    drop(a);
    widgets.notify_all(deliver);
    widgets.retain(|w| w.strong_count() > 0);

    assert_eq!(*log.borrow(), ["a", "b", "b"]);
    assert_eq!(widgets.len(), 1);
}

#[test]
fn unsubscribing_everyone_mid_pass_stops_delivery() {
    let list: Rc<Observers<Rc<dyn Fn(&i32)>>> = Rc::new(Observers::new());
    let total = Rc::new(Cell::new(0));

    let l = list.clone();
    list.subscribe(Rc::new(move |_: &i32| l.clear()));
    for _ in 0..3 {
        let t = total.clone();
        list.subscribe(Rc::new(move |v: &i32| t.set(t.get() + *v)));
    }

    list.notify(&1);
    assert_eq!(total.get(), 0);
    assert!(list.is_empty());
}

#[test]
fn resubscribing_inside_a_pass_gets_a_fresh_id() {
    let list: Rc<Observers<Rc<dyn Fn(&())>>> = Rc::new(Observers::new());
    let ids = Rc::new(RefCell::new(Vec::new()));
    let slot: Rc<Cell<Option<ObserverId>>> = Rc::new(Cell::new(None));

    let (l, i, s) = (list.clone(), ids.clone(), slot.clone());
    let id = list.subscribe(Rc::new(move |_: &()| {
        if let Some(me) = s.take() {
            l.unsubscribe(me);
            let fresh = l.subscribe(Rc::new(|_: &()| {}));
            i.borrow_mut().push(fresh);
        }
    }));
    slot.set(Some(id));

    list.notify(&());
    assert_eq!(ids.borrow().len(), 1);
    assert_ne!(ids.borrow()[0], id);
    assert_eq!(list.len(), 1);
}
