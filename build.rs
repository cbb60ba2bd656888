//! Build stamp for the `sm4` CLI banner.
//!
//! `SOURCE_DATE_EPOCH` pins the stamp for reproducible builds.

use time::OffsetDateTime;

fn build_instant() -> OffsetDateTime {
    std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .unwrap_or_else(OffsetDateTime::now_utc)
}

fn main() {
    let at = build_instant();
    let date = format!("{:04}-{:02}-{:02}", at.year(), u8::from(at.month()), at.day());
    let time = format!("{:02}:{:02}:{:02}", at.hour(), at.minute(), at.second());

    println!("cargo:rustc-env=SM4_BUILD_DATE={}", date);
    println!("cargo:rustc-env=SM4_BUILD_TIME={}", time);
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
}
