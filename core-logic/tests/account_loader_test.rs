use core_logic::{AccountError, AccountLoader, CredentialLoader};
use std::io::Write;

#[tokio::test]
async fn test_loads_accounts_in_file_order() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "user=%7B%22first_name%22%3A%22Ann%22%7D&hash=1").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "# paused account").unwrap();
    writeln!(file, "user=%7B%22first_name%22%3A%22Ben%22%7D&hash=2").unwrap();

    let loader = AccountLoader::new(file.path());
    let accounts = loader.load_credentials().await.unwrap();

    let names: Vec<String> = accounts.iter().map(|a| a.display_name()).collect();
    assert_eq!(names, vec!["Ann", "Ben"]);
}

#[tokio::test]
async fn test_reload_picks_up_edits() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "first").unwrap();

    let loader = AccountLoader::new(file.path());
    assert_eq!(loader.load_credentials().await.unwrap().len(), 1);

    writeln!(file, "second").unwrap();
    file.flush().unwrap();
    assert_eq!(loader.load_credentials().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = AccountLoader::new(dir.path().join("data.txt"));

    let err = loader.load_credentials().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AccountError>(),
        Some(AccountError::ListUnreadable { .. })
    ));
}
