//! Minimal server-rendered pages.

use axum::response::Html;
use entity::{departments, users};
use platform_authz::Role;
use products_hr::Employee;

pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"pt-BR\">\n<head><meta charset=\"utf-8\"><title>{} | RH Manager</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    ))
}

pub fn login(failed: bool) -> Html<String> {
    let notice = if failed {
        "<p class=\"error\">E-mail ou senha inválidos.</p>"
    } else {
        ""
    };
    layout(
        "Login",
        &format!(
            r#"<h1>Login</h1>
{notice}
<form method="post" action="/login">
  <label>E-mail <input type="email" name="email" required></label>
  <label>Senha <input type="password" name="password" required></label>
  <button type="submit">Entrar</button>
</form>
<a href="/forgot-password">Esqueceu a sua senha?</a>"#
        ),
    )
}

pub fn forgot_password() -> Html<String> {
    layout(
        "Recuperar senha",
        r#"<h1>Recuperar senha</h1>
<p>Procure o RH da sua empresa para redefinir o acesso.</p>
<a href="/login">Já sei a minha senha?</a>"#,
    )
}

pub fn home(user: &users::Model, role: Role) -> Html<String> {
    let mut links = Vec::new();
    if role == Role::Admin {
        links.push(r#"<li><a href="/rh-users">Usuários RH</a></li>"#);
        links.push(r#"<li><a href="/departments">Departamentos</a></li>"#);
    }
    if matches!(role, Role::Admin | Role::Rh) {
        links.push(r#"<li><a href="/rh-users/management/home">Colaboradores</a></li>"#);
    }
    layout(
        "Home",
        &format!(
            r#"<h1>Olá, {name}</h1>
<p>Perfil: {role}</p>
<ul>{links}</ul>
<form method="post" action="/logout"><button type="submit">Sair</button></form>"#,
            name = escape(&user.name),
            role = role,
            links = links.concat(),
        ),
    )
}

fn notice_banner(notice: Option<&str>) -> String {
    notice
        .map(|text| format!("<p class=\"notice\">{}</p>\n", escape(text)))
        .unwrap_or_default()
}

fn department_options(departments: &[departments::Model]) -> String {
    departments
        .iter()
        .map(|d| format!("<option value=\"{}\">{}</option>", d.id, escape(&d.name)))
        .collect()
}

fn user_form(action: &str, departments: &[departments::Model], roles: &[Role]) -> String {
    let role_options: String = roles
        .iter()
        .map(|r| format!("<option value=\"{0}\">{0}</option>", r.as_str()))
        .collect();
    format!(
        r#"<form method="post" action="{action}">
  <input name="name" placeholder="Nome" required>
  <input name="email" type="email" placeholder="E-mail" required>
  <select name="select_department">{departments}</select>
  <input name="address" placeholder="Endereço">
  <input name="zip_code" placeholder="CEP">
  <input name="city" placeholder="Cidade">
  <input name="phone" placeholder="Telefone">
  <input name="salary" placeholder="Salário" required>
  <input name="admission_date" type="date" required>
  <select name="role">{role_options}</select>
  <input type="hidden" name="permissions" value="">
  <button type="submit">Salvar</button>
</form>"#,
        departments = department_options(departments),
    )
}

pub fn rh_users(
    rh_users: &[users::Model],
    departments: &[departments::Model],
    notice: Option<&str>,
) -> Html<String> {
    let rows: String = rh_users
        .iter()
        .map(|u| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&u.name),
                escape(&u.email),
                u.admission_date
            )
        })
        .collect();
    layout(
        "Usuários RH",
        &format!(
            "<h1>Usuários RH</h1>\n{}<table>{rows}</table>\n{}",
            notice_banner(notice),
            user_form("/rh-users/create-colaborator", departments, &Role::ALL)
        ),
    )
}

pub fn management(
    employees: &[Employee],
    departments: &[departments::Model],
    notice: Option<&str>,
) -> Html<String> {
    let rows: String = employees
        .iter()
        .map(|e| format!("<li>{}</li>", escape(&e.summary())))
        .collect();
    layout(
        "Colaboradores",
        &format!(
            "<h1>Colaboradores</h1>\n{}<ul>{rows}</ul>\n{}",
            notice_banner(notice),
            user_form(
                "/rh-users/management/create-colaborator",
                departments,
                &[Role::Colaborator]
            )
        ),
    )
}

pub fn departments(departments: &[departments::Model]) -> Html<String> {
    let rows: String = departments
        .iter()
        .map(|d| format!("<li>{} - {}</li>", d.id, escape(&d.name)))
        .collect();
    layout(
        "Departamentos",
        &format!(
            r#"<h1>Departamentos</h1>
<ul>{rows}</ul>
<form method="post" action="/departments/create">
  <input name="name" placeholder="Nome" required>
  <button type="submit">Criar</button>
</form>"#
        ),
    )
}
