// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confirmation email sent at the end of a successful flow.

pub const CONFIRMATION_SUBJECT: &str = "Welcome to Quintes Protocol Whitelist";

pub const CONFIRMATION_HTML: &str = r#"<html>
  <body style="font-family: Arial, sans-serif; background: #000; color: #fff; padding: 40px;">
    <div style="max-width: 600px; margin: 0 auto;">
      <h1 style="color: #CDFA50; font-size: 32px; margin-bottom: 20px;">
        Welcome to Quintes Protocol!
      </h1>
      <p style="font-size: 18px; line-height: 1.6; margin-bottom: 20px;">
        Congratulations! Your spot on the Quintes Protocol whitelist is secured.
      </p>
      <p style="font-size: 16px; line-height: 1.6; margin-bottom: 20px;">
        You're now among the first to experience the next generation of Web3 communication.
      </p>
      <div style="background: #1a1a1a; padding: 20px; border-radius: 8px; margin: 30px 0; border: 2px solid #CDFA50;">
        <p style="margin: 0; font-size: 14px; color: #CDFA50;">
          <strong>What's Next?</strong>
        </p>
        <p style="margin: 10px 0 0 0; font-size: 14px;">
          We'll keep you updated on our launch. Stay tuned for exciting announcements!
        </p>
      </div>
      <p style="font-size: 14px; color: #888; margin-top: 40px;">
        This email was sent via Web3 Mail - decentralized, encrypted, and secure.
      </p>
    </div>
  </body>
</html>
"#;
