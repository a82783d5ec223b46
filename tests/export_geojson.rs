use spatplot::axis::{Domain, Scale, TickFormat};
use spatplot::geojson::{Geometry, PropValue};
use spatplot::models::{Locator, TickFormatter, TickLabel};
use spatplot::serialize::{format_float, to_string};
use spatplot::{
    Axes, Event, EventLog, Exporter, Figure, Line, MapOptions, MarkerProps, Markers, PathPatch,
    RawPath, Text, fig_to_geojson, fig_to_html,
};

fn single_line() -> Figure {
    let mut fig = Figure::default();
    fig.add_axes(Axes::default())
        .push(Line::new(vec![[0.0, 0.0], [1.0, 1.0]]));
    fig
}

#[test]
fn single_line_becomes_one_linestring() {
    let fc = fig_to_geojson(&single_line(), &MapOptions::default()).unwrap();
    assert_eq!(fc.features.len(), 1);
    let f = &fc.features[0];
    assert_eq!(f.geometry, Geometry::LineString(vec![[0.0, 0.0], [1.0, 1.0]]));
    assert_eq!(f.prop("color"), Some(&PropValue::Text("#1F77B4".into())));
    assert_eq!(f.prop("opacity"), Some(&PropValue::Number(1.0)));
    assert_eq!(f.prop("alpha"), Some(&PropValue::Number(1.0)));

    let json = fc.to_json(6).unwrap();
    assert!(json.starts_with(r#"{"type":"FeatureCollection","features":[{"type":"Feature""#));
    assert!(json.contains(r#""coordinates":[[0.000000,0.000000],[1.000000,1.000000]]"#), "{json}");
}

#[test]
fn empty_figure_gives_default_view() {
    let mut fig = Figure::default();
    fig.add_axes(Axes::default());
    assert_eq!(fig.axes.len(), 1);
    let fc = fig_to_geojson(&fig, &MapOptions::default()).unwrap();
    assert!(fc.is_empty());
    assert_eq!(fc.to_json(6).unwrap(), r#"{"type":"FeatureCollection","features":[]}"#);

    let html = fig_to_html(&fig, &MapOptions::default()).unwrap();
    assert!(html.contains("setView([0, 0], 1)"));
    assert!(html.contains(r#"var gjData = {"type":"FeatureCollection","features":[]};"#));
}

#[test]
fn numeric_serializer_rules() {
    assert_eq!(format_float(3.14159265, 2), "3.14");
    assert_eq!(to_string(&[f64::NAN, f64::INFINITY, f64::NEG_INFINITY], 2).unwrap(), "[NaN,Infinity,-Infinity]");
}

#[test]
fn mixed_primitives_map_to_feature_kinds() {
    let mut fig = Figure::default();
    let axes = fig.add_axes(Axes::default());
    axes.push(PathPatch::new(RawPath::polygon(vec![
        [0.0, 0.0],
        [2.0, 0.0],
        [2.0, 2.0],
        [0.0, 2.0],
    ])));
    axes.push(Markers::new(
        vec![[1.0, 1.0], [1.5, 1.5]],
        MarkerProps::new("s", 8.0),
    ));
    axes.push(Text::new([0.5, 0.5], "Berlin"));

    let fc = fig_to_geojson(&fig, &MapOptions::default()).unwrap();
    let kinds: Vec<&str> = fc.features.iter().map(|f| f.geometry.kind()).collect();
    assert_eq!(kinds, ["Polygon", "Point", "Point", "Point"]);

    let marker = &fc.features[1];
    assert_eq!(marker.prop("anchor_x"), Some(&PropValue::Number(5.0)));
    let Some(PropValue::Text(html)) = marker.prop("html") else {
        panic!("marker without html");
    };
    assert!(html.starts_with("<svg"));

    let Some(PropValue::Text(span)) = fc.features[3].prop("html") else {
        panic!("text without html");
    };
    assert!(span.contains(">Berlin</span>"));
}

#[test]
fn web_mercator_input_is_unprojected() {
    let mut fig = Figure::default();
    // Berlin in EPSG:3857 meters
    fig.add_axes(Axes::default()).push(Line::new(vec![
        [0.0, 0.0],
        [1_491_681.9, 6_893_310.7],
    ]));
    let options = MapOptions {
        epsg: Some(3857),
        ..MapOptions::default()
    };
    let fc = fig_to_geojson(&fig, &options).unwrap();
    let Geometry::LineString(pts) = &fc.features[0].geometry else {
        panic!("expected a line");
    };
    assert!((pts[1][0] - 13.4).abs() < 0.001, "{:?}", pts[1]);
    assert!((pts[1][1] - 52.512).abs() < 0.001, "{:?}", pts[1]);
}

#[test]
fn axes_event_carries_axis_introspection() {
    let mut fig = Figure::default();
    let axes = fig.add_axes(Axes::default());
    axes.xaxis.calendar = true;
    axes.xlim = [18322.0, 18323.5];
    axes.yaxis.locator = Locator::Fixed(vec![0.0, 0.5, 1.0]);
    axes.yaxis.formatter = Some(TickFormatter::StrMethod {
        template: "{x:.1f} m".into(),
    });
    axes.yaxis.tick_labels = vec![TickLabel::new("0.0 m"), TickLabel::new("0.5 m")];

    let mut log = EventLog::default();
    Exporter::new(spatplot::transform::Projection::Identity)
        .run(&fig, &mut log)
        .unwrap();
    let Event::OpenAxes(props) = &log.events[1] else {
        panic!("expected axes, got {:?}", log.events[1]);
    };
    assert_eq!(props.xscale, Scale::Date);
    assert_eq!(
        props.xdomain,
        Domain::Date([(2020, 2, 1, 0, 0, 0, 0.0), (2020, 2, 2, 12, 0, 0, 0.0)])
    );
    let y = &props.axes[1];
    assert_eq!(y.nticks, 3);
    assert_eq!(y.tickvalues.as_deref(), Some(&[0.0, 0.5, 1.0][..]));
    assert_eq!(y.tickformat_formatter, "str_method");
    let TickFormat::Template(t) = &y.tickformat else {
        panic!("expected a template, got {:?}", y.tickformat);
    };
    assert_eq!(t.suffix, " m");
    assert_eq!(t.format_spec, ".1f");
}
