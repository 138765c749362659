use anyhow::Result;

pub trait SecretProvider {
    fn read_secret(&self, prompt: &str) -> Result<String>;
}

pub struct TerminalSecrets;

impl SecretProvider for TerminalSecrets {
    fn read_secret(&self, prompt: &str) -> Result<String> {
        Ok(rpassword::prompt_password(prompt)?)
    }
}

#[cfg(test)]
pub struct FixedSecret(pub &'static str);

#[cfg(test)]
impl SecretProvider for FixedSecret {
    fn read_secret(&self, _prompt: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_secret_returns_its_value() {
        let secrets = FixedSecret("hunter2");

        assert_eq!(secrets.read_secret("passphrase: ").unwrap(), "hunter2");
    }
}
