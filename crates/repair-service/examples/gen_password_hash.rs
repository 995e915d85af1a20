//! 生成 bcrypt 密码哈希，用于手工插入账号
//!
//! 运行: cargo run -p repair-service --example gen_password_hash -- <password>...

use repair_service::auth::{hash_password, verify_password};

fn main() -> anyhow::Result<()> {
    let passwords: Vec<String> = std::env::args().skip(1).collect();
    if passwords.is_empty() {
        anyhow::bail!("usage: gen_password_hash <password>...");
    }

    for password in &passwords {
        let hash = hash_password(password)?;
        let verified = verify_password(password, &hash)?;
        println!("{} -> {} (verified: {})", password, hash, verified);
    }

    Ok(())
}
