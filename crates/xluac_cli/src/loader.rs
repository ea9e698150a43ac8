//! Hands a normalised chunk buffer to a real Lua 5.4 VM so it can validate
//! and re-dump it in canonical form, mirroring the reference tool's own
//! `luaL_loadbufferx` / `lua_dump` round trip.

use mlua::Lua;
use xluac_walker::CoreError;

pub fn load_and_redump(buf: &[u8], chunk_name: &str) -> Result<Vec<u8>, CoreError> {
    let lua = Lua::new();

    let function = lua
        .load(buf)
        .set_name(chunk_name)
        .into_function()
        .map_err(|e| CoreError::LoaderRejected(e.to_string()))?;

    Ok(function.dump(false))
}
