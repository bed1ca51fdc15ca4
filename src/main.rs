use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;

use mediadesk::admin::auth::hash_password;
use mediadesk::config::SiteConfig;
use mediadesk::state::AppState;

#[derive(Parser)]
#[command(name = "mediadesk", about = "媒体站点与本地内容后台", version = long_version())]
struct Cli {
    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 启动站点与后台服务
    Serve {
        /// 项目根目录（默认当前目录）
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// 监听地址
        #[arg(long)]
        host: Option<String>,

        /// 监听端口
        #[arg(long)]
        port: Option<u16>,
    },

    /// 生成后台用户的 argon2 密码哈希，写入 [[auth.users]]
    HashPassword {
        /// 明文密码；省略时从标准输入读取一行
        password: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // None 等同于 Serve { root: ".", host: None, port: None }
    let command = cli.command.unwrap_or(Commands::Serve {
        root: PathBuf::from("."),
        host: None,
        port: None,
    });

    // 使用配置中的日志级别作为默认值
    let default_level = match &command {
        Commands::Serve { root, .. } => {
            SiteConfig::load(&root.canonicalize().unwrap_or_else(|_| root.clone()))
                .ok()
                .map(|c| c.server.log_level.clone())
        }
        Commands::HashPassword { .. } => None,
    };
    init_tracing(default_level.as_deref().unwrap_or("info"), cli.log_json);

    match command {
        Commands::Serve { root, host, port } => {
            let root = root.canonicalize()?;
            let site_config = SiteConfig::load(&root)?;

            let host = host.unwrap_or_else(|| site_config.server.host.clone());
            let port = port.unwrap_or(site_config.server.port);

            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(async move { run_server(root, site_config, &host, port).await })?;
        }
        Commands::HashPassword { password } => {
            let password = match password {
                Some(p) => p,
                None => {
                    let mut line = String::new();
                    std::io::stdin().lock().read_line(&mut line)?;
                    line.trim_end_matches(['\r', '\n']).to_string()
                }
            };
            anyhow::ensure!(!password.is_empty(), "密码不能为空");
            println!("{}", hash_password(&password)?);
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run_server(root: PathBuf, site_config: SiteConfig, host: &str, port: u16) -> anyhow::Result<()> {
    let app_state = AppState::open(&root, site_config).await?;
    let app = mediadesk::app(app_state);

    let addr = format!("{host}:{port}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            if let Some(info) = detect_port_process(port) {
                tracing::error!("端口 {port} 已被占用：{info}");
            } else {
                tracing::error!("端口 {port} 已被占用");
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!("服务启动：http://{}（后台 /admin）", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// 通过 /proc 查找监听指定端口的进程（仅 Linux）
fn detect_port_process(port: u16) -> Option<String> {
    use std::fs;

    let port_hex = format!("{:04X}", port);

    for net_file in ["/proc/net/tcp", "/proc/net/tcp6"] {
        let Ok(content) = fs::read_to_string(net_file) else {
            continue;
        };
        for line in content.lines().skip(1) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            // 0A = LISTEN
            if fields.len() < 10 || fields[3] != "0A" {
                continue;
            }
            if fields[1].rsplit(':').next() == Some(port_hex.as_str()) {
                return find_pid_by_inode(fields[9]);
            }
        }
    }
    None
}

fn find_pid_by_inode(target_inode: &str) -> Option<String> {
    use std::fs;

    let socket_pattern = format!("socket:[{target_inode}]");
    for entry in fs::read_dir("/proc").ok()?.flatten() {
        let pid = entry.file_name().to_string_lossy().to_string();
        if !pid.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let Ok(fds) = fs::read_dir(entry.path().join("fd")) else {
            continue;
        };
        for fd in fds.flatten() {
            if let Ok(link) = fs::read_link(fd.path())
                && link.to_string_lossy() == socket_pattern
            {
                let comm = fs::read_to_string(entry.path().join("comm")).unwrap_or_default();
                return Some(format!("PID {pid} ({})", comm.trim()));
            }
        }
    }
    None
}

const fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\ncommit:  ",
        env!("MEDIADESK_GIT_COMMIT"),
        "\nbuild:   ",
        env!("MEDIADESK_BUILD_TIME"),
        "\ntarget:  ",
        env!("MEDIADESK_BUILD_TARGET"),
        "\nprofile: ",
        env!("MEDIADESK_BUILD_PROFILE"),
    )
}
