use crate::router::RequestContext;

/// Demo endpoint that echoes the routed call back at the caller.
pub fn hello(ctx: &mut RequestContext) {
    let path = ctx.path().to_string();
    let params = ctx.params().to_vec();
    let method = ctx.method().to_string();
    let body = ctx.body_string();

    ctx.write_string(&format!(
        "<h1> Hello! </h1> <br><br> Path : {} <br> Path Params : {} <br> Method : {} <br> Body : <br> {} <br> ",
        path,
        params.join(", "),
        method,
        body
    ));

    if params.len() == 2 {
        ctx.write_string(&format!(
            "<br> <h2> Let's go, Captain {} {}! </h2> <br>",
            params[0], params[1]
        ));
    }
}
