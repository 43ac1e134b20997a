//! ARQ 仿真命令行
//!
//! 在不可靠信道上运行一种 ARQ 变体（停等 / 交替位 / 回退 N），
//! 结束时打印统计汇总。

use arqsim_rs::arq::ArqVariant;
use arqsim_rs::channel::run_scenario;
use arqsim_rs::sim::ScenarioSpec;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(name = "arq-sim", about = "不可靠信道上的 ARQ 协议仿真（A -> B 单向数据）")]
struct Args {
    /// 场景文件（JSON）；命令行参数覆盖其中的字段
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// 协议：stop_and_wait / alternating_bit / go_back_n
    #[arg(long)]
    protocol: Option<ArqVariant>,

    /// 回退 N 的窗口大小
    #[arg(long)]
    window_size: Option<usize>,

    /// 重传超时（时间单位）
    #[arg(long)]
    timeout: Option<f64>,

    /// 应用层产生的消息数
    #[arg(long)]
    messages: Option<u64>,

    /// 丢包概率
    #[arg(long)]
    loss: Option<f64>,

    /// 损坏概率
    #[arg(long)]
    corrupt: Option<f64>,

    /// 平均单向时延（时间单位）
    #[arg(long)]
    avg_delay: Option<f64>,

    /// 平均消息间隔（时间单位）
    #[arg(long)]
    message_interval: Option<f64>,

    /// 随机种子
    #[arg(long)]
    seed: Option<u64>,

    /// 允许报文乱序到达
    #[arg(long, default_value_t = false)]
    reorder: bool,

    /// 仿真运行到多少时间单位；不填则跑到事件队列为空
    #[arg(long)]
    until: Option<f64>,

    /// 输出事件轨迹 JSON；不填则不记录
    #[arg(long)]
    trace_json: Option<PathBuf>,

    /// 输出 JSON 格式的统计汇总
    #[arg(long)]
    report_json: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ScenarioSpec {
        ScenarioSpec {
            protocol: self.protocol,
            window_size: self.window_size,
            timeout: self.timeout,
            num_messages: self.messages,
            loss: self.loss,
            corrupt: self.corrupt,
            avg_delay: self.avg_delay,
            message_interval: self.message_interval,
            seed: self.seed,
            reorder: self.reorder.then_some(true),
            until: self.until,
            ..ScenarioSpec::default()
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let base = match &args.scenario {
        Some(path) => ScenarioSpec::load(path).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            process::exit(2);
        }),
        None => ScenarioSpec::default(),
    };
    let scenario = base.merge(args.overrides()).resolve().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(2);
    });

    let out = run_scenario(&scenario, args.trace_json.is_some());

    if let Some(path) = &args.trace_json {
        if let Some(t) = &out.trace {
            let json = serde_json::to_string_pretty(&t.events).expect("serialize trace events");
            fs::write(path, json).expect("write trace json");
            eprintln!("wrote trace events to {}", path.display());
        }
    }

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&out.summary).expect("serialize summary");
        fs::write(path, json).expect("write report json");
        eprintln!("wrote summary to {}", path.display());
    }

    println!("{}", out.summary);
}
