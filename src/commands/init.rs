//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# Site
title: My Blog
description: ''
author: ''

# URL
url: http://example.com
root: /

# Directory
source_dir: source
layout_dir: layouts
public_dir: public

# Writing
new_post_name: ':year-:month-:day-:title.md'
default_layout: default
render_drafts: false
highlight:
  enable: false
  theme: base16-ocean.dark

# Date format (Moment.js style)
date_format: YYYY-MM-DD
summary_length: 160
"#;

const DEFAULT_LAYOUT: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{% if page.title %}{{ page.title }} | {% endif %}{{ site.title }}</title>
</head>
<body>
  <header><a href="{{ site.root }}">{{ site.title }}</a></header>
  <main>
{{ content }}
  </main>
</body>
</html>
"#;

const POST_LAYOUT: &str = r#"---
layout: default
---
<article>
  <h1>{{ page.title }}</h1>
  <time datetime="{{ page.date_xml }}">{{ page.date }}</time>
{{ content }}
  <nav>
    {% if page.next %}<a href="{{ page.next.url }}">{{ page.next.title }}</a>{% endif %}
    {% if page.previous %}<a href="{{ page.previous.url }}">{{ page.previous.title }}</a>{% endif %}
  </nav>
</article>
"#;

const INDEX_PAGE: &str = r#"---
title: Home
---
<ul class="posts">
{% for post in site.posts limit:20 %}  <li><time datetime="{{ post.date_xml }}">{{ post.date }}</time> <a href="{{ post.url }}">{{ post.title }}</a></li>
{% endfor %}</ul>
"#;

const SAMPLE_POST: &str = r#"---
title: Hello World
layout: post
tags: [welcome]
---
Welcome! This is your very first post.

<!-- more -->

## Quick Start

Create a new post:

```bash
$ inkpress new "My New Post"
```

Build the site into `public/`:

```bash
$ inkpress build
```
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("A site already exists in {:?}", target_dir);
    }

    fs::create_dir_all(target_dir.join("source/_posts"))?;
    fs::create_dir_all(target_dir.join("layouts"))?;

    fs::write(&config_path, CONFIG)?;
    fs::write(target_dir.join("layouts/default.html"), DEFAULT_LAYOUT)?;
    fs::write(target_dir.join("layouts/post.html"), POST_LAYOUT)?;
    fs::write(target_dir.join("source/index.html"), INDEX_PAGE)?;

    let today = chrono::Local::now().format("%Y-%m-%d");
    fs::write(
        target_dir.join(format!("source/_posts/{}-hello-world.md", today)),
        SAMPLE_POST,
    )?;

    tracing::info!("Initialized site in {:?}", target_dir);
    Ok(())
}
