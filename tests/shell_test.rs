mod common;

use anyhow::Result;
use cashbook::LedgerService;
use cashbook::cli::{Session, ShellFlow};
use cashbook::config::{AdviceConfig, SmtpConfig};
use common::{SampleLedger, test_repository, test_service};

fn session(service: LedgerService) -> Session {
    Session::new(service, AdviceConfig::default(), SmtpConfig::default())
}

#[tokio::test]
async fn test_ids_stay_valid_across_shell_commands() -> Result<()> {
    let (mut service, temp) = test_service()?;
    SampleLedger::create(&mut service)?;
    let ids: Vec<_> = service.records().iter().map(|r| r.id).collect();
    let mut session = session(service);

    assert_eq!(session.run_line("list --sort amount").await?, ShellFlow::Continue);
    session.run_line(&format!("delete {}", ids[0])).await?;
    session.run_line("list --month 2024-02").await?;

    // The remaining records keep the ids shown before the delete
    session
        .run_line(&format!("update {} --note \"rent, paid late\"", ids[2]))
        .await?;
    session
        .run_line(&format!("update {} -a -12.25", ids[1]))
        .await?;

    let service = session.service();
    assert_eq!(service.len(), 2);
    assert_eq!(service.record(ids[2])?.note, "rent, paid late");
    assert_eq!(service.record(ids[1])?.amount, -1225);
    assert!(service.get(ids[0]).is_none());

    let reopened = LedgerService::open(test_repository(&temp))?;
    assert_eq!(reopened.records()[1].note, "rent, paid late");

    Ok(())
}

#[tokio::test]
async fn test_failing_line_keeps_session_usable() -> Result<()> {
    let (mut service, _temp) = test_service()?;
    SampleLedger::create(&mut service)?;
    let first = service.records()[0].id;
    let mut session = session(service);

    session.run_line(&format!("delete {}", first)).await?;
    assert!(session.run_line(&format!("delete {}", first)).await.is_err());
    assert!(session.run_line("add abc -c Food -d 2024-01-01").await.is_err());
    assert!(session.run_line("frobnicate").await.is_err());
    assert!(session.run_line("note \"unbalanced").await.is_err());
    assert!(session.run_line("shell").await.is_err());

    session
        .run_line("add -3.5 -c Food -d 2024-02-05 -n \"coffee beans\"")
        .await?;
    assert_eq!(session.service().len(), 3);
    assert_eq!(session.service().records()[2].note, "coffee beans");

    Ok(())
}

#[tokio::test]
async fn test_exit_and_blank_lines() -> Result<()> {
    let (service, _temp) = test_service()?;
    let mut session = session(service);

    assert_eq!(session.run_line("   ").await?, ShellFlow::Continue);
    assert_eq!(session.run_line("exit").await?, ShellFlow::Exit);
    assert_eq!(session.run_line(" quit ").await?, ShellFlow::Exit);

    Ok(())
}
