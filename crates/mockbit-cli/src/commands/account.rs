//! 계정 관련 명령.

use crate::context::{prompt_line, prompt_password, CliContext};
use tracing::info;

/// 로그인.
pub async fn login(ctx: &CliContext, username: &str) -> anyhow::Result<()> {
    let password = prompt_password("비밀번호: ")?;

    let user = ctx.api.login(username, &password).await?;

    info!(username = %user.username, "Login succeeded");
    println!("\n✅ 로그인 완료: {} ({})", user.nickname, user.email);
    Ok(())
}

/// 회원 가입.
pub async fn signup(
    ctx: &CliContext,
    username: &str,
    email: &str,
    nickname: &str,
) -> anyhow::Result<()> {
    let password = prompt_password("비밀번호: ")?;
    let confirm = prompt_password("비밀번호 확인: ")?;

    {
        use secrecy::ExposeSecret;
        if password.expose_secret() != confirm.expose_secret() {
            anyhow::bail!("비밀번호가 일치하지 않습니다");
        }
    }

    let response = ctx.api.signup(username, email, nickname, &password).await?;

    println!("\n✅ 회원 가입 완료: {}", response.message);
    println!("mockbit login -u {} 으로 로그인하세요.", username);
    Ok(())
}

/// 로그아웃.
pub async fn logout(ctx: &CliContext) -> anyhow::Result<()> {
    if !ctx.session.is_authenticated().await {
        println!("로그인 상태가 아닙니다.");
        return Ok(());
    }

    ctx.api.logout().await?;
    println!("✅ 로그아웃 완료. 저장된 세션을 삭제했습니다.");
    Ok(())
}

/// 내 프로필 조회.
pub async fn profile(ctx: &CliContext) -> anyhow::Result<()> {
    let user = ctx.api.profile().await?;

    println!("\n내 정보");
    println!("  아이디:  {}", user.username);
    println!("  이메일:  {}", user.email);
    println!("  닉네임:  {}", user.nickname);
    Ok(())
}

/// 닉네임 변경.
pub async fn change_nickname(ctx: &CliContext, nickname: &str) -> anyhow::Result<()> {
    let response = ctx.api.change_nickname(nickname).await?;
    println!("✅ {}", response.message);
    Ok(())
}

/// 비밀번호 변경.
pub async fn change_password(ctx: &CliContext) -> anyhow::Result<()> {
    let current = prompt_password("현재 비밀번호: ")?;
    let new = prompt_password("새 비밀번호: ")?;

    let response = ctx.api.change_password(&current, &new).await?;
    println!("✅ {}", response.message);
    Ok(())
}

/// 파산 신청. 잔고와 보유 종목이 초기화됩니다.
pub async fn bankrupt(ctx: &CliContext, yes: bool) -> anyhow::Result<()> {
    if !yes {
        let answer = prompt_line(
            "⚠️  파산 신청 시 보유 종목과 잔고가 모두 초기화됩니다. 계속하려면 'bankrupt' 입력: ",
        )?;
        if answer != "bankrupt" {
            println!("취소했습니다.");
            return Ok(());
        }
    }

    let response = ctx.api.declare_bankruptcy().await?;
    println!("✅ {}", response.message);
    Ok(())
}

/// 회원 탈퇴.
pub async fn delete(ctx: &CliContext, yes: bool) -> anyhow::Result<()> {
    if !yes {
        let answer =
            prompt_line("⚠️  탈퇴 후에는 계정을 복구할 수 없습니다. 계속하려면 'delete' 입력: ")?;
        if answer != "delete" {
            println!("취소했습니다.");
            return Ok(());
        }
    }

    let response = ctx.api.delete_account().await?;
    println!("✅ {}", response.message);
    Ok(())
}
