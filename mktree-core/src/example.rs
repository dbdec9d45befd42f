pub const EXAMPLE: &str = "/domain-distributor/
├── index.php
├── auth/
│   ├── login.php
│   ├── register.php
│   ├── github-login.php
│   └── verify-email.php
├── dashboard.php
├── admin/
│   ├── index.php
│   ├── users.php
│   ├── domains.php
│   └── settings.php
├── includes/
│   ├── config.php
│   ├── db.php
│   ├── functions.php
│   ├── captcha.php
│   └── auth.php
├── assets/
│   ├── css/
│   │   └── style.css
│   ├── js/
│   │   └── script.js
│   └── images/
├── mail/
│   └── sendmail.php
├── api/
│   └── cloudflare.php
└── .env
";
