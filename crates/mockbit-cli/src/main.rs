//! 모의 거래소 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 로그인 (세션은 암호화되어 저장됨)
//! mockbit login -u tester
//!
//! # 마켓 목록 검색
//! mockbit markets --search btc
//!
//! # 실시간 시세
//! mockbit watch KRW-BTC KRW-ETH
//!
//! # 보유 자산 평가
//! mockbit portfolio
//!
//! # 최근 30일 누적 손익
//! mockbit profit --days 30
//!
//! # 지정가 매수 주문
//! mockbit order KRW-BTC --side buy --type limit --quantity 0.01 --price 50000000
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

mod commands;
mod context;

use context::CliContext;

#[derive(Parser)]
#[command(name = "mockbit")]
#[command(about = "Mockbit CLI - 모의 암호화폐 거래소 클라이언트", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로 (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 로그인
    Login {
        /// 로그인 아이디
        #[arg(short, long)]
        username: String,
    },

    /// 회원 가입
    Signup {
        /// 로그인 아이디
        #[arg(short, long)]
        username: String,

        /// 이메일
        #[arg(short, long)]
        email: String,

        /// 닉네임
        #[arg(short, long)]
        nickname: String,
    },

    /// 로그아웃 (저장된 세션 삭제)
    Logout,

    /// 마켓 목록 조회
    Markets {
        /// 검색어 (마켓 코드 또는 종목명)
        #[arg(short, long)]
        search: Option<String>,
    },

    /// 실시간 시세 보기
    Watch {
        /// 마켓 코드 목록 (예: KRW-BTC KRW-ETH)
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// 보유 자산 평가 및 총 자산 요약
    Portfolio,

    /// 거래내역 조회
    History {
        /// 최근 N일만 표시 (기본: 전체)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// 기간 누적 손익 조회
    Profit {
        /// 조회 기간 (일)
        #[arg(short, long, default_value = "30")]
        days: i64,
    },

    /// 주문 제출
    Order {
        /// 마켓 코드 (예: KRW-BTC)
        market: String,

        /// 주문 방향 (buy, sell)
        #[arg(short, long)]
        side: String,

        /// 주문 유형 (market, limit)
        #[arg(short = 't', long = "type", default_value = "limit")]
        order_type: String,

        /// 주문 수량
        #[arg(short, long)]
        quantity: String,

        /// 지정가 (지정가 주문에 필수)
        #[arg(short, long)]
        price: Option<String>,
    },

    /// 미체결 주문 목록 조회
    Orders,

    /// 주문 취소
    Cancel {
        /// 주문 ID
        order_id: String,
    },

    /// 계정 관리
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// 내 프로필 조회
    Profile,

    /// 닉네임 변경
    Nickname {
        /// 새 닉네임
        nickname: String,
    },

    /// 비밀번호 변경
    Password,

    /// 파산 신청 (잔고/보유 종목 초기화)
    Bankrupt {
        /// 확인 없이 실행
        #[arg(long)]
        yes: bool,
    },

    /// 회원 탈퇴
    Delete {
        /// 확인 없이 실행
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let ctx = match CliContext::init(cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("초기화 실패: {}", e);
            return Err(e);
        }
    };

    let result = match cli.command {
        Commands::Login { username } => commands::account::login(&ctx, &username).await,

        Commands::Signup {
            username,
            email,
            nickname,
        } => commands::account::signup(&ctx, &username, &email, &nickname).await,

        Commands::Logout => commands::account::logout(&ctx).await,

        Commands::Markets { search } => {
            commands::market::list_markets(&ctx, search.as_deref()).await
        }

        Commands::Watch { codes } => commands::market::watch(&ctx, &codes).await,

        Commands::Portfolio => commands::portfolio::show_portfolio(&ctx).await,

        Commands::History { days } => commands::portfolio::show_history(&ctx, days).await,

        Commands::Profit { days } => commands::portfolio::show_profit(&ctx, days).await,

        Commands::Order {
            market,
            side,
            order_type,
            quantity,
            price,
        } => {
            commands::order::place(
                &ctx,
                &market,
                &side,
                &order_type,
                &quantity,
                price.as_deref(),
            )
            .await
        }

        Commands::Orders => commands::order::list_open(&ctx).await,

        Commands::Cancel { order_id } => commands::order::cancel(&ctx, &order_id).await,

        Commands::Account { command } => match command {
            AccountCommands::Profile => commands::account::profile(&ctx).await,
            AccountCommands::Nickname { nickname } => {
                commands::account::change_nickname(&ctx, &nickname).await
            }
            AccountCommands::Password => commands::account::change_password(&ctx).await,
            AccountCommands::Bankrupt { yes } => commands::account::bankrupt(&ctx, yes).await,
            AccountCommands::Delete { yes } => commands::account::delete(&ctx, yes).await,
        },
    };

    if let Err(e) = &result {
        error!("Command failed: {}", e);
    }

    result
}
