//! AIGC 后台管理 CLI 工具

use aigc_admin_core::router::{SubscriptionTab, SystemTab, Tab, TabSelector};
use aigc_admin_core::{
    AdminClient, ClientConfig, Error, ExpiresUnit, Plan, PlanDraft, PlanType, Router, Screen,
    WechatDraft,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aigc-admin")]
#[command(about = "AIGC 后台管理客户端工具", long_about = None)]
struct Cli {
    /// 服务器地址（默认读取 AIGC_ADMIN_SERVER）
    #[arg(short, long)]
    server: Option<String>,

    /// API 前缀
    #[arg(long)]
    base_path: Option<String>,

    /// 会话文件路径
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// 请求超时（秒）
    #[arg(long)]
    timeout: Option<u64>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 登录
    Login {
        /// 用户名
        #[arg(short, long)]
        username: String,
        /// 密码
        #[arg(short, long)]
        password: String,
    },
    /// 登出
    Logout,
    /// 查看会话状态及当前页面
    Status {
        /// 页面路径
        #[arg(long, default_value = aigc_admin_core::router::DEFAULT_PATH)]
        path: String,
    },
    /// 订阅方案
    #[command(subcommand)]
    Plan(PlanCommands),
    /// 微信设置
    #[command(subcommand)]
    Wechat(WechatCommands),
}

#[derive(Subcommand)]
enum PlanCommands {
    /// 列出全部方案
    List,
    /// 新增方案
    Add {
        #[arg(long, value_enum, default_value_t = PlanKind::Subscription)]
        kind: PlanKind,
        /// 价格（分）
        #[arg(long, default_value_t = 1)]
        price: i64,
        /// 时长
        #[arg(long, default_value_t = 1)]
        expires: i64,
        #[arg(long, value_enum, default_value_t = Unit::Month)]
        unit: Unit,
        /// 点数
        #[arg(long, default_value_t = 1)]
        point: i64,
        /// 创建后立即启用
        #[arg(long)]
        enable: bool,
    },
    /// 按 id 删除方案
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// 启用方案
    Enable { id: i64 },
    /// 停用方案
    Disable { id: i64 },
}

#[derive(Subcommand)]
enum WechatCommands {
    /// 显示当前设置
    Show,
    /// 修改设置，未指定的项保持原值
    Set(WechatOverrides),
}

#[derive(Args)]
struct WechatOverrides {
    #[arg(long)]
    login_id: Option<String>,
    #[arg(long)]
    app_id: Option<String>,
    #[arg(long)]
    app_secret: Option<String>,
    #[arg(long)]
    mch_id: Option<String>,
    #[arg(long)]
    mch_cert_serial: Option<String>,
    #[arg(long)]
    pub_key_id: Option<String>,
    #[arg(long)]
    api_v3_pwd: Option<String>,
    /// 商户私钥 PEM 文件
    #[arg(long)]
    api_client_key_file: Option<PathBuf>,
    /// 微信支付公钥 PEM 文件
    #[arg(long)]
    pub_key_file: Option<PathBuf>,
    #[arg(long)]
    login_callback: Option<String>,
    #[arg(long)]
    payment_callback: Option<String>,
    /// 支付有效期（秒）
    #[arg(long)]
    payment_expires: Option<i64>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlanKind {
    Subscription,
    Trail,
}

#[derive(Clone, Copy, ValueEnum)]
enum Unit {
    Month,
    Day,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::from_env();
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(base_path) = cli.base_path {
        config.base_path = base_path;
    }
    if let Some(token_file) = cli.token_file {
        config.token_path = token_file;
    }
    if cli.timeout.is_some() {
        config.timeout = cli.timeout;
    }

    debug!("Using server {}{}", config.server_url, config.base_path);
    let client = AdminClient::from_config(config)?;

    let result = match cli.command {
        Commands::Login { username, password } => do_login(&client, &username, &password).await,
        Commands::Logout => do_logout(&client),
        Commands::Status { path } => do_status(&client, &path),
        Commands::Plan(command) => do_plan(&client, command).await,
        Commands::Wechat(command) => do_wechat(&client, command).await,
    };

    if let Err(e) = result {
        // 核心库的错误已经通过通知输出，这里只补充登录提示
        match e.downcast_ref::<Error>() {
            Some(Error::NoAuth) => eprintln!("未登录或登录已过期，请先执行: aigc-admin login"),
            Some(_) => {}
            None => eprintln!("错误: {:#}", e),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn do_login(client: &AdminClient, username: &str, password: &str) -> anyhow::Result<()> {
    println!("正在登录用户: {}", username);
    client.login(username, password).await?;
    println!("登录成功!");
    Ok(())
}

fn do_logout(client: &AdminClient) -> anyhow::Result<()> {
    client.logout()?;
    println!("已登出");
    Ok(())
}

fn do_status(client: &AdminClient, path: &str) -> anyhow::Result<()> {
    let router = Router::at(path);

    if client.auth().is_logged_in() {
        println!("会话状态: 已登录");
    } else {
        println!("会话状态: 未登录");
    }

    match router.screen(client.auth()) {
        Some(Screen::Login) => println!("当前页面: 登录"),
        Some(screen) => {
            let nav: Vec<_> = Screen::NAV.iter().map(|(title, _)| *title).collect();
            println!("当前页面: {}", screen.title());
            println!("导航: {}", nav.join(" | "));
            match screen {
                Screen::Subscription => print_tabs(TabSelector::<SubscriptionTab>::default()),
                Screen::System => print_tabs(TabSelector::<SystemTab>::default()),
                _ => {}
            }
        }
        None => println!("当前页面: 未知路径 {}", path),
    }
    Ok(())
}

fn print_tabs<T: Tab>(selector: TabSelector<T>) {
    let labels: Vec<_> = T::ALL
        .iter()
        .map(|tab| {
            if *tab == selector.current() {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect();
    println!("标签: {}", labels.join(" "));
}

async fn do_plan(client: &AdminClient, command: PlanCommands) -> anyhow::Result<()> {
    let plans = client.plans();

    let list = match command {
        PlanCommands::List => plans.list().await?,
        PlanCommands::Add {
            kind,
            price,
            expires,
            unit,
            point,
            enable,
        } => {
            let draft = PlanDraft {
                stype: match kind {
                    PlanKind::Subscription => PlanType::Subscription,
                    PlanKind::Trail => PlanType::Trail,
                },
                price,
                expires,
                unit: match unit {
                    Unit::Month => ExpiresUnit::Month,
                    Unit::Day => ExpiresUnit::Day,
                },
                point,
                enable,
            };
            plans.add(&draft).await?
        }
        PlanCommands::Delete { ids } => plans.remove(ids).await?,
        PlanCommands::Enable { id } => plans.set_enabled(id, true).await?,
        PlanCommands::Disable { id } => plans.set_enabled(id, false).await?,
    };

    print_plans(&list);
    Ok(())
}

fn print_plans(plans: &[Plan]) {
    println!(
        "{:>6}  {:<6}  {:>8}  {:>6}  {:>8}  {}",
        "id", "类型", "订价", "有效期", "施法点", "状态"
    );
    for plan in plans {
        println!(
            "{:>6}  {:<6}  {:>8}  {:>6}  {:>8}  {}",
            plan.id,
            plan.stype.label(),
            plan.price,
            plan.duration_label(),
            plan.point,
            if plan.enable { "已启用" } else { "已禁用" }
        );
    }
}

async fn do_wechat(client: &AdminClient, command: WechatCommands) -> anyhow::Result<()> {
    let wechat = client.wechat();

    match command {
        WechatCommands::Show => {
            let draft = wechat.load().await?;
            print_wechat(&draft);
        }
        WechatCommands::Set(overrides) => {
            let mut draft = wechat.load_or_default().await?;
            apply_overrides(&mut draft, overrides)?;

            let report = wechat.save(&draft).await?;
            for outcome in &report.outcomes {
                let state = match &outcome.result {
                    Ok(()) => "成功".to_string(),
                    Err(e) => format!("失败 ({})", e),
                };
                println!("{}: {}", outcome.field, state);
            }
            if let Some(e) = report.outcomes.into_iter().find_map(|o| o.result.err()) {
                return Err(e.into());
            }
        }
    }
    Ok(())
}

fn apply_overrides(draft: &mut WechatDraft, overrides: WechatOverrides) -> anyhow::Result<()> {
    let secrets = &mut draft.secrets;
    let fields = [
        (&mut secrets.login_id, overrides.login_id),
        (&mut secrets.app_id, overrides.app_id),
        (&mut secrets.app_secret, overrides.app_secret),
        (&mut secrets.mch_id, overrides.mch_id),
        (&mut secrets.mch_cert_serial, overrides.mch_cert_serial),
        (&mut secrets.pub_key_id, overrides.pub_key_id),
        (&mut secrets.api_v3_pwd, overrides.api_v3_pwd),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            *field = value;
        }
    }

    if let Some(path) = overrides.api_client_key_file {
        secrets.api_client_key = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("读取私钥文件 {:?} 失败: {}", path, e))?;
    }
    if let Some(path) = overrides.pub_key_file {
        secrets.pub_key = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("读取公钥文件 {:?} 失败: {}", path, e))?;
    }
    if let Some(url) = overrides.login_callback {
        draft.login_callback = url;
    }
    if let Some(url) = overrides.payment_callback {
        draft.payment_callback = url;
    }
    if let Some(seconds) = overrides.payment_expires {
        draft.payment_expires = seconds;
    }
    Ok(())
}

fn print_wechat(draft: &WechatDraft) {
    let secrets = &draft.secrets;

    println!("[扫码登录设置]");
    println!("  登录AppId: {}", secrets.login_id);
    println!("  登录鉴权回调API: {}", draft.login_callback);
    println!("[支付设置]");
    println!("  商户id: {}", secrets.mch_id);
    println!("  商户证书序列号: {}", secrets.mch_cert_serial);
    println!("  支付结果回调: {}", draft.payment_callback);
    println!("  支付有效期(秒): {}", draft.payment_expires);
    println!("[API设置]");
    println!("  AppID: {}", secrets.app_id);
    println!("  AppSecret: {}", secrets.app_secret);
    println!("[增强安全设置]");
    println!("  公钥ID: {}", secrets.pub_key_id);
    println!("  APIv3密码: {}", secrets.api_v3_pwd);
    println!("  公钥:\n{}", secrets.pub_key);
    println!("  私钥:\n{}", secrets.api_client_key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_apply_overrides_keeps_unset_fields() {
        let mut draft = WechatDraft {
            login_callback: "https://old/login".to_string(),
            payment_expires: 600,
            ..WechatDraft::default()
        };
        draft.secrets.mch_id = "1900000109".to_string();

        let cli = Cli::parse_from([
            "aigc-admin",
            "wechat",
            "set",
            "--app-id",
            "wx_app",
            "--payment-expires",
            "900",
        ]);
        let Commands::Wechat(WechatCommands::Set(overrides)) = cli.command else {
            panic!("unexpected command");
        };
        apply_overrides(&mut draft, overrides).unwrap();

        assert_eq!(draft.secrets.app_id, "wx_app");
        assert_eq!(draft.secrets.mch_id, "1900000109");
        assert_eq!(draft.login_callback, "https://old/login");
        assert_eq!(draft.payment_expires, 900);
    }
}
