use atom_config::secrets;
use std::env;

/// Encrypts a credential for the `user_credentials.encrypted_secret` column.
///
/// Usage:
///   encrypt_secret <plaintext>
///   encrypt_secret --generate-key [path]
fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: encrypt_secret <plaintext>");
        eprintln!("       encrypt_secret --generate-key [path]");
        eprintln!("The key is read from ATOM_ENCRYPTION_KEY or the file in ATOM_ENCRYPTION_KEY_PATH.");
        std::process::exit(2);
    }

    if args[1] == "--generate-key" {
        let path = args.get(2).map(String::as_str).unwrap_or(".atom_key");
        match secrets::write_new_key_file(path) {
            Ok(key) => {
                println!("{}", key);
                eprintln!("Key written to {}. Set ATOM_ENCRYPTION_KEY to this value in production.", path);
            }
            Err(err) => {
                eprintln!("Error generating key: {}", err);
                std::process::exit(1);
            }
        }
        return;
    }

    match secrets::encrypt_string(&args[1]) {
        Ok(ciphertext) => println!("{}", ciphertext),
        Err(err) => {
            eprintln!("Error encrypting secret: {}", err);
            std::process::exit(1);
        }
    }
}
