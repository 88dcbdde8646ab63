use serde_json::{json, Value};
use vizij_animated_view::{
    AnimatedView, AnimationConfig, ConfigInput, Easing, LayoutSize, StartOptions, StyleValue,
    ViewConfig,
};
use vizij_test_fixtures::batches;

fn linear(ms: f64) -> StartOptions {
    StartOptions::new().duration(ms).easing(Easing::Linear)
}

fn start_of(view: &AnimatedView, key: &str) -> StyleValue {
    view.channel(key)
        .unwrap_or_else(|| panic!("channel {key}"))
        .range
        .0
        .clone()
}

#[test]
fn card_fixture_resolves_from_style_and_shorthand() {
    let style: Value = batches::style("card-expand")
        .expect("load card style")
        .expect("card-expand has a style");
    let input: Value = batches::load("card-expand").expect("load card-expand");

    let mut view = AnimatedView::new(ViewConfig::default().with_style(style));
    view.start(ConfigInput::from_json(&input).expect("list input"), linear(100.0));

    assert_eq!(start_of(&view, "backgroundColor"), StyleValue::Color("#000000".into()));
    // paddingTop <- paddingVertical (absent) <- padding
    assert_eq!(start_of(&view, "paddingTop"), StyleValue::Number(12.0));
    // marginLeft <- marginHorizontal
    assert_eq!(start_of(&view, "marginLeft"), StyleValue::Number(8.0));
    assert_eq!(start_of(&view, "shadowOffset_height"), StyleValue::Number(2.0));

    view.update(50.0);
    let rendered = view.render();
    assert_eq!(
        rendered.get("backgroundColor"),
        Some(&json!("rgba(128,128,128,1.00)"))
    );
    assert_eq!(rendered.get("paddingTop"), Some(&json!(18)));
    assert_eq!(rendered.get("marginLeft"), Some(&json!(4)));
    assert_eq!(rendered.get("shadowOffset"), Some(&json!({"width": 2, "height": 4})));
    // untouched base properties pass through
    assert_eq!(rendered.get("padding"), Some(&json!(12)));
    assert_eq!(rendered.get("shadowOpacity"), Some(&json!(0.2)));
}

#[test]
fn semantic_defaults_without_style() {
    let mut view = AnimatedView::default();
    view.start(
        ConfigInput::from_json(&json!({
            "color": "#ff0000",
            "transform": [{"skewX": "10deg"}, {"scaleY": 2}],
            "shadowOpacity": 0.5,
            "borderWidth": 3
        }))
        .unwrap(),
        linear(100.0),
    );
    assert_eq!(start_of(&view, "color"), StyleValue::Color("transparent".into()));
    assert_eq!(start_of(&view, "transform_skewX"), StyleValue::Angle(0.0));
    assert_eq!(start_of(&view, "transform_scaleY"), StyleValue::Number(1.0));
    assert_eq!(start_of(&view, "shadowOpacity"), StyleValue::Number(1.0));
    // unknown properties start from zero and animate numerically
    assert_eq!(start_of(&view, "borderWidth"), StyleValue::Number(0.0));

    view.update(50.0);
    let rendered = view.render();
    assert_eq!(rendered.get("color"), Some(&json!("rgba(128,0,0,0.50)")));
    assert_eq!(rendered.get("borderWidth"), Some(&json!(1.5)));
}

#[test]
fn size_comes_from_layout_when_available() {
    let mut view = AnimatedView::default();
    view.start(AnimationConfig::new("width", 100), linear(100.0));
    assert_eq!(start_of(&view, "width"), StyleValue::Number(0.0));

    view.set_layout(Box::new(|| {
        Some(LayoutSize {
            width: 240.0,
            height: 60.0,
        })
    }));
    view.start(AnimationConfig::new("height", 100), linear(100.0));
    assert_eq!(start_of(&view, "height"), StyleValue::Number(60.0));

    view.clear_layout();
    view.start(AnimationConfig::new("minHeight", 10), linear(100.0));
    assert_eq!(start_of(&view, "minHeight"), StyleValue::Number(0.0));
}

#[test]
fn explicit_init_beats_style() {
    let mut view =
        AnimatedView::new(ViewConfig::default().with_style(json!({"opacity": 0.3})));
    view.start(
        AnimationConfig::new("opacity", 1).init(0.9),
        linear(100.0),
    );
    assert_eq!(start_of(&view, "opacity"), StyleValue::Number(0.9));
}
