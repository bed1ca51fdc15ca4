use std::process::Command;

fn main() {
    let commit = run("git", &["rev-parse", "--short", "HEAD"]);
    let build_time = run("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]);
    let target = env_or_unknown("TARGET");
    let profile = env_or_unknown("PROFILE");

    for (key, value) in [
        ("MEDIADESK_GIT_COMMIT", commit),
        ("MEDIADESK_BUILD_TIME", build_time),
        ("MEDIADESK_BUILD_TARGET", target),
        ("MEDIADESK_BUILD_PROFILE", profile),
    ] {
        println!("cargo:rustc-env={key}={value}");
    }

    // sqlx::migrate! 在编译期嵌入迁移文件
    println!("cargo:rerun-if-changed=migrations");
    println!("cargo:rerun-if-changed=.git/HEAD");
}

/// 执行外部命令并取其输出，失败时返回 "unknown"
fn run(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn env_or_unknown(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| "unknown".to_string())
}
