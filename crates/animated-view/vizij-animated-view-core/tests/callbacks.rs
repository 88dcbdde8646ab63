use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use vizij_animated_view::{
    AnimatedView, AnimationConfig, ConfigInput, Easing, FrameInfo, StartOptions, StyleValue,
    ViewConfig,
};

type Frames = Rc<RefCell<Vec<FrameInfo>>>;

fn recorder() -> (Frames, impl Fn(&FrameInfo) + 'static) {
    let frames: Frames = Rc::default();
    let sink = frames.clone();
    (frames, move |info: &FrameInfo| sink.borrow_mut().push(info.clone()))
}

fn linear(ms: f64) -> StartOptions {
    StartOptions::new().duration(ms).easing(Easing::Linear)
}

#[test]
fn frame_callback_reports_every_tick() {
    let (frames, on_frame) = recorder();
    let mut view = AnimatedView::default();
    view.start(
        AnimationConfig::new("opacity", 1).init(0),
        linear(100.0).on_frame(on_frame),
    );
    view.update(50.0);
    view.update(50.0);

    let frames = frames.borrow();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].name, "opacity");
    assert_eq!(frames[0].num, 0.5);
    assert_eq!(frames[0].value, StyleValue::Number(0.5));
    assert!(!frames[0].is_finish);
    assert!(frames[1].is_finish);
    assert_eq!(
        frames[1].output_range,
        [StyleValue::Number(0.0), StyleValue::Number(1.0)]
    );
}

#[test]
fn descriptor_callback_overrides_batch_callback() {
    let (batch_frames, on_batch) = recorder();
    let (own_frames, on_own) = recorder();
    let mut view = AnimatedView::default();
    view.start(
        vec![
            AnimationConfig::new("opacity", 1),
            AnimationConfig::new("width", 10).on_frame(on_own),
        ],
        linear(100.0).on_frame(on_batch),
    );
    view.update(100.0);
    assert!(batch_frames.borrow().iter().all(|f| f.name == "opacity"));
    assert_eq!(own_frames.borrow().len(), 1);
    assert_eq!(own_frames.borrow()[0].name, "width");
}

#[test]
fn view_defaults_apply_to_every_batch() {
    let (frames, on_frame) = recorder();
    let finished = Rc::new(RefCell::new(Vec::new()));
    let sink = finished.clone();
    let cfg = ViewConfig::default()
        .on_frame(on_frame)
        .on_finish(move |f| sink.borrow_mut().push(f));
    let mut view = AnimatedView::new(cfg);

    view.start(
        ConfigInput::from_json(&json!({"opacity": 0})).unwrap(),
        linear(100.0),
    );
    view.update(40.0);
    view.start(
        ConfigInput::from_json(&json!({"opacity": 1})).unwrap(),
        linear(100.0),
    );
    view.update(100.0);

    assert_eq!(*finished.borrow(), vec![false, true]);
    assert_eq!(frames.borrow().len(), 2);
}

#[test]
fn retargeting_replaces_the_listener() {
    let (frames, on_frame) = recorder();
    let mut view = AnimatedView::default();
    view.start(
        AnimationConfig::new("opacity", 1).on_frame(on_frame),
        linear(100.0),
    );
    view.update(10.0);
    view.start(AnimationConfig::new("opacity", 0), linear(100.0));
    assert!(view.channel("opacity").unwrap().subscription().is_none());
    view.update(50.0);
    assert_eq!(frames.borrow().len(), 1);
}

#[test]
fn dispose_silences_everything() {
    let (frames, on_frame) = recorder();
    let finished = Rc::new(RefCell::new(Vec::new()));
    let sink = finished.clone();
    let mut view = AnimatedView::default();
    let done = view.start(
        AnimationConfig::new("opacity", 1),
        linear(100.0)
            .on_frame(on_frame)
            .on_finish(move |f| sink.borrow_mut().push(f)),
    );
    view.update(25.0);
    view.dispose();

    assert_eq!(done.result(), Some(false));
    assert!(finished.borrow().is_empty());
    assert!(view
        .channels()
        .iter()
        .all(|ch| ch.progress.listener_count() == 0));
    view.update(25.0);
    assert_eq!(frames.borrow().len(), 1);
}

#[test]
fn dropping_the_view_settles_its_batch() {
    let mut view = AnimatedView::default();
    let done = view.start(AnimationConfig::new("opacity", 1), linear(100.0));
    drop(view);
    assert_eq!(done.result(), Some(false));
}
