// ABOUTME: Benchmark suite for the AT grammar, line framing and SMS PDU decoding
// ABOUTME: Measures parse costs on the hot paths a modem session exercises per line

use bytes::BytesMut;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use hayes::datatypes::encoding::{pack_septets, text_to_septets};
use hayes::datatypes::{Message, UserDataEncoding, parse_parameters};
use hayes::frame;
use hayes::sms::Sms;
use std::time::Duration;

const DELIVER: &str =
    "07911326040000F0040B911346610089F60000208062917314800CC8F71D14969741F977FD07";
const DELIVER_UCS2: &str = "000409D0D4327BFC0600182140109051258006041F04400438";
const STATUS_REPORT: &str = "00062A0B916407281553F8211062214300802110622153008000";

fn bench_parameters(c: &mut Criterion) {
    let mut group = c.benchmark_group("parameters");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("flat", |b| {
        b.iter(|| parse_parameters(black_box("1,\"SM\",20,99")).unwrap())
    });

    group.bench_function("nested", |b| {
        b.iter(|| {
            parse_parameters(black_box(
                "(2,\"KPN\",\"KPN\",\"20408\",7),(1,\"T-Mobile\",\"TMO\",\"20416\",2),,(0-4),(0-2)",
            ))
            .unwrap()
        })
    });

    group.finish();
}

fn bench_message_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_parse");
    group.measurement_time(Duration::from_secs(10));

    for line in ["OK", "+CSQ: 20,99", "AT+CMGR=1", "+CMTI: \"SM\",3"] {
        group.bench_with_input(BenchmarkId::new("line", line), line, |b, line| {
            b.iter(|| black_box(line).parse::<Message>().unwrap())
        });
    }

    group.finish();
}

fn bench_framing(c: &mut Criterion) {
    let mut group = c.benchmark_group("framing");
    group.measurement_time(Duration::from_secs(10));

    let burst = format!("\r\n+CMGR: 0,,24\r\n{DELIVER}\r\n\r\nOK\r\n");
    group.bench_function("cmgr_burst", |b| {
        b.iter(|| {
            let mut buf = BytesMut::from(black_box(burst.as_bytes()));
            let mut lines = 0;
            while let Some(line) = frame::parse_line(&mut buf) {
                if !line.is_empty() {
                    lines += 1;
                }
            }
            lines
        })
    });

    group.finish();
}

fn bench_pdu_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdu_decode");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("deliver_gsm7", |b| {
        b.iter(|| Sms::decode(black_box("+CMGR: 0,,24"), black_box(DELIVER), None).unwrap())
    });

    group.bench_function("deliver_ucs2", |b| {
        b.iter(|| Sms::decode(black_box("+CMT: ,22"), black_box(DELIVER_UCS2), None).unwrap())
    });

    group.bench_function("status_report", |b| {
        b.iter(|| {
            Sms::decode(black_box("+CMGR: 0,,25"), black_box(STATUS_REPORT), None).unwrap()
        })
    });

    group.finish();
}

fn bench_gsm7_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("gsm7_sizes");
    group.measurement_time(Duration::from_secs(10));

    let message_sizes = [10, 50, 100, 160]; // Common SMS message sizes

    for &size in &message_sizes {
        let text = "A".repeat(size);
        let hex = UserDataEncoding::Gsm7.encode(&text).unwrap();

        group.bench_with_input(BenchmarkId::new("decode", size), &hex, |b, hex| {
            b.iter(|| UserDataEncoding::Gsm7.decode(black_box(hex)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("pack", size), &text, |b, text| {
            b.iter(|| pack_septets(&text_to_septets(black_box(text)).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parameters,
    bench_message_parse,
    bench_framing,
    bench_pdu_decode,
    bench_gsm7_sizes
);
criterion_main!(benches);
