use chrono::Duration;
use ground_track::config::DEFAULT_WRAP_THRESHOLD;
use ground_track::ground_track::generate;
use ground_track::observer::observation_time;
use ground_track::{
    segment, Direction, Error, GroundTrackPlot, GroundTrackRequest, Observer, PlotColors,
    Satellite, Tle,
};

const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

fn iss() -> Satellite {
    Satellite::from_tle(Tle::parse(ISS_TLE).unwrap()).unwrap()
}

#[test]
fn two_day_track_splits_once_per_crossing() {
    let sat = iss();
    let reference = observation_time("2020-07-13", "06:00", -4.0).unwrap();
    let periods = 31.0; // about two days
    let request = GroundTrackRequest::new(reference, periods).with_samples_per_period(120);
    let gt = generate(&sat, &request).unwrap();

    let segments = segment(&gt.track, DEFAULT_WRAP_THRESHOLD);
    let crossings = gt
        .track
        .samples()
        .windows(2)
        .filter(|w| {
            w[0].lon.signum() != w[1].lon.signum() && (w[1].lon - w[0].lon).abs() > 180.0
        })
        .count();
    assert_eq!(segments.len(), crossings + 1);
    // the track drifts ~23 deg west per orbit, so it cannot cross the seam more than once an orbit
    assert!(crossings as f64 <= periods + 1.0);
    assert!(crossings as f64 >= periods - 3.0);
}

#[test]
fn plot_for_backward_track() {
    let sat = iss();
    let observer = Observer::validated(51.5, -0.1)
        .unwrap()
        .with_time((sat.epoch() + Duration::days(2)).fixed_offset());
    let request = GroundTrackRequest::new(observer.time, 2.0).with_direction(Direction::Backward);
    let gt = generate(&sat, &request).unwrap();

    let colors = PlotColors {
        path: "olive".into(),
        ..PlotColors::default()
    };
    let plot = GroundTrackPlot::build(&gt, &observer, &colors, DEFAULT_WRAP_THRESHOLD);

    let total: usize = plot.lines.iter().map(|l| l.lon.len()).sum();
    assert_eq!(total, gt.track.len());
    assert!(plot.lines.iter().all(|l| l.color == "olive" && l.lon.len() == l.lat.len()));

    let last_line = plot.lines.last().unwrap();
    assert_eq!(*last_line.lon.last().unwrap(), gt.track.samples().last().unwrap().lon);
    assert_eq!(plot.observer.lon, -0.1);
}

#[test]
fn window_is_measured_from_epoch_in_both_directions() {
    let sat = iss();
    let before = (sat.epoch() - Duration::days(29)).fixed_offset();
    assert!(generate(&sat, &GroundTrackRequest::new(before, 1.0)).is_ok());

    // a backward track ending 30 days before epoch starts outside the window
    let request = GroundTrackRequest::new((sat.epoch() - Duration::days(30)).fixed_offset(), 1.0)
        .with_direction(Direction::Backward);
    assert!(matches!(
        generate(&sat, &request),
        Err(Error::OutsidePropagationWindow { .. })
    ));
}

#[cfg(feature = "web")]
#[test]
fn plot_serializes_as_line_objects() {
    let sat = iss();
    let request = GroundTrackRequest::new(sat.epoch().fixed_offset(), 1.0);
    let gt = generate(&sat, &request).unwrap();
    let plot = GroundTrackPlot::with_default_threshold(
        &gt,
        &Observer::from_lat_lon(0.0, 0.0),
        &PlotColors::default(),
    );

    let json = serde_json::to_value(&plot).unwrap();
    assert_eq!(json["title"], "ISS (ZARYA) Ground Track");
    assert!(json["lines"][0]["lon"].is_array());
    assert_eq!(json["reference"]["name"], "Satellite @ Reference");
}
