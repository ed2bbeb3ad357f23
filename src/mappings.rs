//! Compile-time tables used by the later stages of the Resolver cascade:
//! the static module->distribution mapping, the bundled popular-distribution
//! index, and the framework-extras table.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Module names whose import name differs from their distribution name on
/// the package index. Checked before the bundled index and before any
/// network lookup.
pub const STATIC_MAPPING: &[(&str, &str)] = &[
    ("cv2", "opencv-python"),
    ("PIL", "Pillow"),
    ("zmq", "pyzmq"),
    ("Crypto", "pycryptodome"),
    ("yaml", "PyYAML"),
    ("wx", "wxPython"),
    ("git", "GitPython"),
    ("docx", "python-docx"),
    ("kafka", "kafka-python"),
    ("nacl", "PyNaCl"),
    ("skimage", "scikit-image"),
    ("attr", "attrs"),
    ("sklearn", "scikit-learn"),
    ("bs4", "beautifulsoup4"),
    ("dateutil", "python-dateutil"),
    ("jwt", "PyJWT"),
    ("OpenSSL", "pyOpenSSL"),
    ("serial", "pyserial"),
    ("usb", "pyusb"),
    ("magic", "python-magic"),
    ("dotenv", "python-dotenv"),
    ("slugify", "python-slugify"),
    ("telebot", "pyTelegramBotAPI"),
    ("discord", "discord.py"),
    ("MySQLdb", "mysqlclient"),
    ("psycopg2", "psycopg2-binary"),
    ("lxml", "lxml"),
    ("markdown", "Markdown"),
    ("jinja2", "Jinja2"),
    ("flask_sqlalchemy", "Flask-SQLAlchemy"),
    ("flask_migrate", "Flask-Migrate"),
    ("flask_login", "Flask-Login"),
    ("flask_cors", "Flask-Cors"),
    ("jose", "python-jose"),
    ("multipart", "python-multipart"),
    ("dns", "dnspython"),
    ("gi", "PyGObject"),
    ("cairo", "pycairo"),
    ("Xlib", "python-xlib"),
    ("win32api", "pywin32"),
    ("win32com", "pywin32"),
    ("win32con", "pywin32"),
    ("google", "google-api-python-client"),
    ("googleapiclient", "google-api-python-client"),
    ("grpc", "grpcio"),
    ("nmap", "python-nmap"),
    ("Levenshtein", "python-Levenshtein"),
    ("fitz", "PyMuPDF"),
    ("cachetools", "cachetools"),
    ("consolemenu", "console-menu"),
    ("pptx", "python-pptx"),
    ("pylab", "matplotlib"),
    ("pygments", "Pygments"),
    ("ldap3", "ldap3"),
    ("caldav", "caldav"),
    ("icalendar", "icalendar"),
    ("keyring", "keyring"),
    ("paho", "paho-mqtt"),
    ("rospy", "rospkg"),
    ("engineio", "python-engineio"),
    ("socketio", "python-socketio"),
    ("Cryptodome", "pycryptodomex"),
];

static STATIC_MAPPING_LOOKUP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| STATIC_MAPPING.iter().copied().collect());

pub fn static_mapping_lookup(top_level_module: &str) -> Option<&'static str> {
    STATIC_MAPPING_LOOKUP.get(top_level_module).copied()
}

/// Popular distributions shipped for offline resolution, assumed to equal
/// their importable module name (lowercased, hyphen-normalized).
pub const BUNDLED_INDEX: &[&str] = &[
    "requests", "numpy", "pandas", "scipy", "matplotlib", "django", "flask", "fastapi",
    "uvicorn", "gunicorn", "celery", "redis", "sqlalchemy", "pytest", "click", "pydantic",
    "boto3", "botocore", "httpx", "aiohttp", "tornado", "twisted", "urllib3", "certifi",
    "idna", "charset-normalizer", "six", "packaging", "setuptools", "wheel", "pip",
    "virtualenv", "tox", "black", "isort", "flake8", "mypy", "pylint", "ruff", "coverage",
    "tqdm", "rich", "colorama", "termcolor", "loguru", "structlog", "arrow", "pendulum",
    "pytz", "tzlocal", "babel", "jinja2", "markupsafe", "werkzeug", "itsdangerous",
    "starlette", "anyio", "sniffio", "h11", "websockets", "paramiko", "cryptography",
    "bcrypt", "passlib", "pyjwt", "oauthlib", "requests-oauthlib", "authlib",
    "beautifulsoup4", "lxml", "html5lib", "scrapy", "selenium", "playwright", "pillow",
    "opencv-python", "scikit-learn", "scikit-image", "xgboost", "lightgbm", "catboost",
    "statsmodels", "sympy", "networkx", "numba", "dask", "polars", "pyarrow", "fastparquet",
    "openpyxl", "xlrd", "xlsxwriter", "tabulate", "jsonschema", "marshmallow", "attrs",
    "cattrs", "dataclasses-json", "pyyaml", "toml", "tomli", "python-dotenv", "dynaconf",
    "pydantic-settings", "typer", "docopt", "fire", "invoke", "fabric", "ansible",
    "docker", "kubernetes", "jinja2-cli", "jsonpatch", "jsonpointer", "deepdiff",
    "more-itertools", "toolz", "cytoolz", "funcy", "multidict", "yarl", "frozenlist",
    "aiosignal", "async-timeout", "greenlet", "eventlet", "gevent", "uvloop", "trio",
    "curio", "pyzmq", "pika", "kombu", "billiard", "vine", "amqp", "confluent-kafka",
    "kafka-python", "pymongo", "motor", "psycopg2-binary", "asyncpg", "aiomysql",
    "pymysql", "mysqlclient", "cx-oracle", "pyodbc", "sqlite-utils", "alembic",
    "peewee", "tortoise-orm", "databases", "redis-py-cluster", "hiredis", "memcached",
    "pymemcache", "elasticsearch", "opensearch-py", "influxdb-client", "prometheus-client",
    "sentry-sdk", "datadog", "newrelic", "opentelemetry-api", "opentelemetry-sdk",
    "grpcio", "grpcio-tools", "protobuf", "thrift", "avro", "msgpack", "cbor2",
    "orjson", "ujson", "simplejson", "xmltodict", "dicttoxml", "faker", "factory-boy",
    "hypothesis", "freezegun", "responses", "httpretty", "vcrpy", "mock", "nose",
    "nose2", "pytest-cov", "pytest-mock", "pytest-asyncio", "pytest-django",
    "pytest-xdist", "tox-pyenv", "pre-commit", "bandit", "safety", "pip-tools",
    "pipenv", "poetry", "hatch", "build", "twine", "pyinstaller", "cx-freeze",
    "nuitka", "cython", "pybind11", "cffi", "pycparser", "wcwidth", "prompt-toolkit",
    "pygments", "ipython", "jupyter", "notebook", "jupyterlab", "ipykernel", "nbformat",
    "nbconvert", "traitlets", "zmq", "pyzotero", "gitpython", "pygithub", "slack-sdk",
    "discord-py", "tweepy", "praw", "pyngrok", "watchdog", "psutil", "py-cpuinfo",
    "distro", "platformdirs", "appdirs", "send2trash", "pyperclip", "keyboard", "mouse",
];

static BUNDLED_INDEX_LOOKUP: LazyLock<std::collections::HashSet<String>> = LazyLock::new(|| {
    BUNDLED_INDEX.iter().map(|s| s.to_lowercase()).collect()
});

pub fn is_in_bundled_index(normalized_name: &str) -> bool {
    BUNDLED_INDEX_LOOKUP.contains(normalized_name)
}

/// Extras recommended alongside a primary distribution, added as peer
/// dependencies after the cascade resolves the primary (spec.md §4.3).
pub const FRAMEWORK_EXTRAS: &[(&str, &[&str])] = &[
    ("fastapi", &["uvicorn"]),
    ("django", &["gunicorn"]),
    ("flask", &["gunicorn"]),
    ("celery", &["redis"]),
    ("sqlalchemy", &["psycopg2-binary"]),
];

static FRAMEWORK_EXTRAS_LOOKUP: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| FRAMEWORK_EXTRAS.iter().copied().collect());

pub fn framework_extras_for(distribution_name: &str) -> Option<&'static [&'static str]> {
    FRAMEWORK_EXTRAS_LOOKUP.get(distribution_name).copied()
}
