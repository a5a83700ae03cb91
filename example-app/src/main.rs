//! # 示例应用程序
//!
//! 演示配置快照存储：加载配置包目录、注册变更监听器、监视目录并在修改时重新加载。
//!
//! 配置包目录约定：
//! - `Settings.json`：参数节集合，键为参数节名
//! - `<逻辑名>.json`：配置文档

use anyhow::Context;
use clap::Parser;
use config_abstractions::{
    ConfigPackage, ConfigPackageListener, DocumentChangedEvent, FnDocumentListener,
};
use config_common::{ConfigSections, ListenerError};
use config_impl::{
    ConfigPackageLoader, ConfigSnapshotStore, LoggingChangeListener, PackageEventRouter,
    SnapshotStoreOptions, TypedValueAccessor,
};
use notify::{recommended_watcher, Event, RecursiveMode, Watcher};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 参数节集合文件名
const SETTINGS_FILE: &str = "Settings.json";

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "配置快照存储示例应用")]
struct Args {
    /// 配置包目录
    #[arg(short, long, default_value = "config")]
    package_dir: PathBuf,

    /// 服务地址，逻辑名取最后一段
    #[arg(short, long, default_value = "fabric:/App/Service")]
    service_address: String,

    /// 存储选项文件
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// 示例配置文档
#[derive(Debug, Clone, Deserialize)]
struct AppSettings {
    #[serde(default)]
    name: String,
    #[serde(default)]
    port: u16,
    #[serde(default)]
    features: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    info!("启动配置快照存储示例应用");

    let store = Arc::new(build_store(&args)?);
    let router = PackageEventRouter::new(Arc::clone(&store));

    let mut version = 1_u64;
    let mut current = read_package(&args.package_dir, version)?;
    router.on_package_added(current.clone()).await?;
    report(&store);

    let (sender, mut receiver) = mpsc::channel::<()>(16);
    let mut watcher = recommended_watcher(move |res: Result<Event, notify::Error>| match res {
        Ok(event) if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() => {
            // 通道已满说明已有待处理的重新加载
            let _ = sender.try_send(());
        }
        Ok(_) => {}
        Err(e) => error!("目录监视错误: {}", e),
    })?;
    watcher.watch(&args.package_dir, RecursiveMode::NonRecursive)?;
    info!("开始监视配置包目录: {}", args.package_dir.display());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("收到退出信号，正在关闭应用");
                break;
            }
            Some(()) = receiver.recv() => {
                version += 1;
                let next = match read_package(&args.package_dir, version) {
                    Ok(package) => package,
                    Err(e) => {
                        warn!("读取配置包失败，保留当前配置: {:#}", e);
                        continue;
                    }
                };
                match router.on_package_modified(current.clone(), next.clone()).await {
                    Ok(()) => report(&store),
                    Err(e) => warn!("重新加载配置包失败: {}", e),
                }
                current = next;
            }
        }
    }

    info!("应用已关闭");
    Ok(())
}

/// 构建快照存储并注册监听器
fn build_store(args: &Args) -> anyhow::Result<ConfigSnapshotStore<AppSettings>> {
    let options =
        SnapshotStoreOptions::load_for_address(args.options.as_deref(), &args.service_address)?;
    info!("配置逻辑名: {}", options.logical_name);

    let store = ConfigSnapshotStore::new(options)?;
    store.register_section_listener(Arc::new(LoggingChangeListener::new()));
    store.register_document_listener(Arc::new(LoggingChangeListener::new()));
    store.register_document_listener(Arc::new(FnDocumentListener::new(
        "PortWatcher",
        |event: &DocumentChangedEvent<AppSettings>| -> Result<(), ListenerError> {
            let previous = event.previous.as_ref().map(|settings| settings.port);
            let current = event.current.as_ref().map(|settings| settings.port);
            if previous != current {
                info!("监听端口变更: {:?} -> {:?}", previous, current);
            }
            Ok(())
        },
    )));
    Ok(store)
}

/// 从目录读取配置包
fn read_package(dir: &Path, version: u64) -> anyhow::Result<ConfigPackage> {
    ConfigPackageLoader::validate_path(dir)?;

    let settings_path = dir.join(SETTINGS_FILE);
    let sections = match std::fs::read(&settings_path) {
        Ok(content) => serde_json::from_slice::<ConfigSections>(&content)
            .with_context(|| format!("解析参数节文件失败: {}", settings_path.display()))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigSections::new(),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("读取参数节文件失败: {}", settings_path.display()))
        }
    };

    Ok(ConfigPackage::new(dir, sections)
        .with_name("Config")
        .with_version(version.to_string()))
}

/// 输出当前配置
fn report(store: &ConfigSnapshotStore<AppSettings>) {
    info!("存储状态: {:?}", store.state());
    if let Some(settings) = store.document() {
        info!(
            "配置文档: name={}, port={}, features={:?}",
            settings.name, settings.port, settings.features
        );
    }
    let port = store.get_i32("Port", 8080);
    let verbose = store.get_bool("Verbose", false);
    info!("参数节: Port={}, Verbose={}", port, verbose);
}
