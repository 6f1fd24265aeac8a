use super::*;

#[tokio::test]
async fn piped_password_is_first_line_without_newline() {
    let password = read_password_line(&b"s3cret pw \r\nnext\n"[..]).await.unwrap();
    assert_eq!(password, "s3cret pw ");
}

#[tokio::test]
async fn piped_password_at_eof_is_empty() {
    assert_eq!(read_password_line(&b""[..]).await.unwrap(), "");
}

#[test]
fn login_password_flag_is_optional() {
    let cli = Cli::try_parse_from(["chatterm", "login", "alice"]).unwrap();
    assert!(matches!(cli.command, Command::Login { ref user, password: None } if user == "alice"));
}
