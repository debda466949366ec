use axum::response::Html;

use rightsplace_shared::types::FieldErrors;

use crate::domain::ProfileRole;
use crate::forms::{LoginForm, RegistrationForm};
use crate::session::Flash;

use super::{checkbox, html_escape, input, layout, non_field_errors, select};

pub fn login_page(form: &LoginForm, errors: &FieldErrors, flash: Option<Flash>) -> Html<String> {
    let next = form
        .next
        .as_deref()
        .map(|n| format!(r#"<input type="hidden" name="next" value="{}">"#, html_escape(n)))
        .unwrap_or_default();

    let body = format!(
        r#"<h1>Log in</h1>
<form method="post" action="/login/">
    {non_field}
    {identifier}
    {password}
    {next}
    <button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register/">Register</a>, or <a href="/report/anonymous/">report anonymously</a>.</p>"#,
        non_field = non_field_errors(errors),
        identifier = input("text", "identifier", "Username or email", form.identifier.as_deref(), errors),
        password = input("password", "password", "Password", None, errors),
    );

    layout("Log in", None, flash, &body)
}

pub fn register_page(form: &RegistrationForm, errors: &FieldErrors) -> Html<String> {
    let roles: Vec<(&str, &str)> = ProfileRole::ALL.iter().map(|r| (r.as_str(), r.label())).collect();
    let selected = form.role().unwrap_or(ProfileRole::User);

    let body = format!(
        r#"<h1>Create an account</h1>
<form method="post" action="/register/">
    {non_field}
    {role}
    {username}
    {password}
    {first_name}
    {last_name}
    {email}
    {phone}
    {city}
    {state}
    <fieldset data-role="user">
        {wants_contact}
    </fieldset>
    <fieldset data-role="lawyer">
        <legend>Lawyer details</legend>
        {enrolment}
        {specialization}
    </fieldset>
    <fieldset data-role="ngo">
        <legend>Organization details</legend>
        {organization}
        {rc_number}
    </fieldset>
    <button type="submit">Register</button>
</form>
<script>
    (function () {{
        var role = document.getElementById('id_role');
        function sync() {{
            document.querySelectorAll('fieldset[data-role]').forEach(function (fs) {{
                fs.hidden = fs.dataset.role !== role.value;
            }});
        }}
        role.addEventListener('change', sync);
        sync();
    }})();
</script>"#,
        non_field = non_field_errors(errors),
        role = select("role", "I am registering as", &roles, Some(selected.as_str()), errors),
        username = input("text", "username", "Username", form.username.as_deref(), errors),
        password = input("password", "password", "Password", None, errors),
        first_name = input("text", "first_name", "First name", form.first_name.as_deref(), errors),
        last_name = input("text", "last_name", "Last name", form.last_name.as_deref(), errors),
        email = input("email", "email", "Email", form.email.as_deref(), errors),
        phone = input("tel", "phone_number", "Phone number", form.phone_number.as_deref(), errors),
        city = input("text", "city", "City", form.city.as_deref(), errors),
        state = input("text", "state", "State", form.state.as_deref(), errors),
        wants_contact = checkbox(
            "wants_contact",
            "I would like a lawyer or NGO to contact me",
            crate::forms::checkbox(form.wants_contact.as_deref()),
            errors,
        ),
        enrolment = input("text", "enrolment_number", "Enrolment number", form.enrolment_number.as_deref(), errors),
        specialization = input("text", "specialization", "Specialization", form.specialization.as_deref(), errors),
        organization = input("text", "organization_name", "Organization name", form.organization_name.as_deref(), errors),
        rc_number = input("text", "rc_number", "RC number", form.rc_number.as_deref(), errors),
    );

    layout("Register", None, None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_keeps_next_and_identifier() {
        let form = LoginForm {
            identifier: Some("amina".into()),
            password: Some("secret".into()),
            next: Some("/my-reports/".into()),
        };
        let Html(html) = login_page(&form, &FieldErrors::new(), None);
        assert!(html.contains(r#"value="/my-reports/""#));
        assert!(html.contains(r#"value="amina""#));
        assert!(!html.contains("secret"));
    }

    #[test]
    fn register_page_shows_role_errors() {
        let form = RegistrationForm { role: Some("ngo".into()), ..Default::default() };
        let mut errors = FieldErrors::new();
        errors.add("organization_name", "This field is required.");
        let Html(html) = register_page(&form, &errors);
        assert!(html.contains(r#"<option value="ngo" selected>"#));
        assert!(html.contains("This field is required."));
    }
}
