use super::*;
use crate::util::round_to;
use chrono::{TimeZone, Utc};
use nalgebra::{Quaternion, UnitQuaternion};
use rand::Rng;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn from_deg(roll: f64, pitch: f64, yaw: f64) -> UnitQuaternion<f64> {
    UnitQuaternion::from_euler_angles(roll.to_radians(), pitch.to_radians(), yaw.to_radians())
}

fn sample_at(secs: i64) -> OrientationSample {
    OrientationSample::new(Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(), UnitQuaternion::identity())
}

#[test]
fn test_decode_identity_is_level() {
    let att = AttitudeDecoder::decode(&UnitQuaternion::identity());
    assert_eq!(att, AttitudeAngles { roll: 0.0, pitch: 0.0, yaw: 0.0 });
    let panel = AttitudeDecoder::default().panel_angles(&UnitQuaternion::identity());
    assert_eq!(panel, PanelAngles { beta: 0.0, gamma_c: 0.0 });
}

#[test]
fn test_decode_known_attitude() {
    let q = from_deg(5.0, 30.0, -120.0);
    let att = AttitudeDecoder::decode(&q);
    assert_eq!(att, AttitudeAngles { roll: 5.0, pitch: 30.0, yaw: -120.0 });
    let panel = AttitudeDecoder::new(PanelMounting::PitchYaw).panel_angles(&q);
    assert_eq!(panel, PanelAngles { beta: 30.0, gamma_c: -120.0 });
}

#[test]
fn test_decode_rounds_to_two_decimals() {
    let q = from_deg(0.0, 12.345_678, 98.765_432);
    let panel = AttitudeDecoder::default().panel_angles(&q);
    assert_eq!(panel.beta, 12.35);
    assert_eq!(panel.gamma_c, 98.77);
}

#[test]
fn test_decode_is_idempotent_for_random_orientations() {
    let mut rng = rand::rng();
    let decoder = AttitudeDecoder::new(PanelMounting::CombinedTilt);
    for _ in 0..500 {
        let q: UnitQuaternion<f64> = UnitQuaternion::from_quaternion(Quaternion::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0) + 1.5,
        ));
        assert_eq!(AttitudeDecoder::decode(&q), AttitudeDecoder::decode(&q));
        assert_eq!(decoder.panel_angles(&q), decoder.panel_angles(&q));
    }
}

#[test]
fn test_decode_recovers_euler_angles() {
    let mut rng = rand::rng();
    for _ in 0..500 {
        let (r, p, y): (f64, f64, f64) = (
            rng.random_range(-170.0..170.0),
            rng.random_range(-80.0..80.0),
            rng.random_range(-170.0..170.0),
        );
        let att = AttitudeDecoder::decode(&from_deg(r, p, y));
        assert!((att.roll - r).abs() <= 0.005 + 1e-9, "roll {r} decoded as {}", att.roll);
        assert!((att.pitch - p).abs() <= 0.005 + 1e-9, "pitch {p} decoded as {}", att.pitch);
        assert!((att.yaw - y).abs() <= 0.005 + 1e-9, "yaw {y} decoded as {}", att.yaw);
    }
}

#[test]
fn test_panel_mountings() {
    let q = from_deg(30.0, 40.0, 10.0);
    let pitch_yaw = AttitudeDecoder::new(PanelMounting::PitchYaw).panel_angles(&q);
    let roll_yaw = AttitudeDecoder::new(PanelMounting::RollYaw).panel_angles(&q);
    let combined = AttitudeDecoder::new(PanelMounting::CombinedTilt).panel_angles(&q);
    let expected_tilt = round_to(
        (30f64.to_radians().cos() * 40f64.to_radians().cos()).acos().to_degrees(),
        2,
    );
    assert_eq!(pitch_yaw.beta, 40.0);
    assert_eq!(roll_yaw.beta, 30.0);
    assert_eq!(combined.beta, expected_tilt);
    assert!(combined.beta > pitch_yaw.beta);
    for panel in [pitch_yaw, roll_yaw, combined] {
        assert_eq!(panel.gamma_c, 10.0);
    }
}

#[test]
fn test_panel_mounting_names() {
    assert_eq!("pitch_yaw".parse::<PanelMounting>().unwrap(), PanelMounting::PitchYaw);
    assert_eq!("ROLL_YAW".parse::<PanelMounting>().unwrap(), PanelMounting::RollYaw);
    assert_eq!(PanelMounting::CombinedTilt.to_string(), "combined_tilt");
    assert!("roll".parse::<PanelMounting>().is_err());
}

#[test]
fn test_raw_sample_validation() {
    let time = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let zero = RawOrientationSample { time, re: 0.0, im: [0.0; 3] };
    assert!(matches!(OrientationSample::try_from(zero), Err(SampleError::Degenerate(_))));
    let nan = RawOrientationSample { time, re: f64::NAN, im: [0.0; 3] };
    assert_eq!(OrientationSample::try_from(nan), Err(SampleError::NotFinite));
    let scaled = RawOrientationSample { time, re: 2.0, im: [0.0; 3] };
    let sample = OrientationSample::try_from(scaled).unwrap();
    assert_eq!(sample.timestamp(), time);
    assert!((sample.orientation().quaternion().norm() - 1.0).abs() < 1e-12);
}

#[test]
fn test_parse_sample_line() {
    let sample =
        parse_sample_line(r#"{"time":"2026-10-16T12:00:00Z","re":0.9659258,"im":[0.0,0.258819,0.0]}"#)
            .unwrap();
    assert_eq!(sample.timestamp(), Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap());
    let panel = AttitudeDecoder::default().panel_angles(sample.orientation());
    assert_eq!(panel.beta, 30.0);
    assert!(matches!(parse_sample_line("{\"time\": 3}"), Err(LineError::Json(_))));
    assert!(matches!(
        parse_sample_line(r#"{"time":"2026-10-16T12:00:00Z","re":0,"im":[0,0,0]}"#),
        Err(LineError::Sample(_))
    ));
}

#[test]
fn test_latest_source_returns_each_sample_once() {
    let (tx, mut source) = LatestSampleSource::channel();
    assert!(source.try_read_latest().is_none());
    assert!(source.try_read_latest().is_none());

    tx.send_replace(Some(sample_at(0)));
    assert_eq!(source.try_read_latest(), Some(sample_at(0)));
    assert!(source.try_read_latest().is_none());

    tx.send_replace(Some(sample_at(1)));
    tx.send_replace(Some(sample_at(2)));
    assert_eq!(source.try_read_latest(), Some(sample_at(2)));
    assert!(source.try_read_latest().is_none());
    assert!(source.is_connected());

    drop(tx);
    assert!(source.try_read_latest().is_none());
    assert!(!source.is_connected());
}

#[test]
fn test_latest_source_delivers_last_sample_after_feed_closed() {
    let (tx, mut source) = LatestSampleSource::channel();
    tx.send_replace(Some(sample_at(0)));
    assert_eq!(source.try_read_latest(), Some(sample_at(0)));

    tx.send_replace(Some(sample_at(1)));
    drop(tx);
    assert!(!source.is_connected());
    assert_eq!(source.try_read_latest(), Some(sample_at(1)));
    assert!(source.try_read_latest().is_none());
    assert!(source.try_read_latest().is_none());
}

#[tokio::test]
async fn test_pump_skips_malformed_and_stale_lines() {
    let input = concat!(
        "{\"time\":\"2026-10-16T12:00:01Z\",\"re\":1.0,\"im\":[0.0,0.0,0.0]}\n",
        "not json\n",
        "\n",
        "{\"time\":\"2026-10-16T12:00:00Z\",\"re\":1.0,\"im\":[0.0,0.0,0.0]}\n",
        "{\"time\":\"2026-10-16T12:00:02Z\",\"re\":1.0,\"im\":[0.0,0.0,0.0]}\n",
    );
    let (tx, mut source) = LatestSampleSource::channel();
    let end = ImuFeed::pump(input.as_bytes(), &tx, CancellationToken::new()).await;
    assert!(matches!(end, FeedEnd::Closed));
    let latest = source.try_read_latest().unwrap();
    assert_eq!(latest.timestamp(), Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 2).unwrap());
    assert!(source.try_read_latest().is_none());
}

#[tokio::test]
async fn test_pump_stops_on_cancel() {
    let (_writer, reader) = tokio::io::duplex(64);
    let (tx, _source) = LatestSampleSource::channel();
    let c_tok = CancellationToken::new();
    c_tok.cancel();
    let end = ImuFeed::pump(reader, &tx, c_tok).await;
    assert!(matches!(end, FeedEnd::Cancelled));
}

#[tokio::test]
async fn test_connect_fails_fast_without_feed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);
    let res = ImuFeed::connect(&addr, CancellationToken::new()).await;
    assert!(matches!(res, Err(FeedError::Connect { .. })));
}

#[tokio::test]
async fn test_connect_delivers_samples() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let line = "{\"time\":\"2026-10-16T12:00:00Z\",\"re\":1.0,\"im\":[0.0,0.0,0.0]}\n";
        socket.write_all(line.as_bytes()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });
    let c_tok = CancellationToken::new();
    let (mut source, handle) = ImuFeed::connect(&addr, c_tok.clone()).await.unwrap();
    let mut received = None;
    for _ in 0..100 {
        received = source.try_read_latest();
        if received.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let sample = received.expect("no sample arrived from the feed");
    assert_eq!(sample.timestamp(), Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap());
    c_tok.cancel();
    handle.await.unwrap();
}
