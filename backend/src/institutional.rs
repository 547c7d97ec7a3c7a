//! Institutional pages linked from the site footer.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};

use crate::{
    pages::layout,
    seo::{html_escape, PageMeta},
    state::AppState,
};

pub struct InfoPage {
    pub path: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Trusted HTML placed inside the page's `article` element.
    pub body: &'static str,
}

pub const ABOUT: InfoPage = InfoPage {
    path: "/sobre",
    title: "Sobre Nós",
    description: "Conheça o VivaCripto, seu portal de notícias sobre criptomoedas em português.",
    body: r#"<h1>Sobre o VivaCripto</h1>
<p>O <strong>VivaCripto</strong> é o seu portal de notícias sobre criptomoedas em português, criado para manter você informado sobre as últimas novidades do mercado cripto de forma clara, objetiva e acessível.</p>
<h2>Nossa Missão</h2>
<p>Democratizar o acesso à informação sobre criptomoedas, oferecendo conteúdo de qualidade em português brasileiro.</p>
<h2>O Que Fazemos</h2>
<p>Utilizamos tecnologia, incluindo inteligência artificial, para agregar, processar e apresentar as principais notícias do mercado cripto:</p>
<ul><li>Atualizações constantes sobre o mercado</li><li>Cobertura de Bitcoin, Ethereum, Altcoins, DeFi e Regulação</li><li>Conteúdo em português brasileiro de fácil compreensão</li><li>Informações de fontes confiáveis</li></ul>
<h2>Nosso Compromisso</h2>
<p>O VivaCripto é um portal <strong>puramente informativo</strong>. Não oferecemos conselhos financeiros, recomendações de investimento ou calls de trade.</p>
<p class="notice"><strong>Importante:</strong> O mercado de criptomoedas é volátil e envolve riscos. Sempre faça sua própria pesquisa (DYOR) antes de tomar decisões de investimento.</p>"#,
};

pub const CONTACT: InfoPage = InfoPage {
    path: "/contato",
    title: "Contato",
    description: "Entre em contato com a equipe do VivaCripto.",
    body: r#"<h1>Entre em Contato</h1>
<p>Tem alguma dúvida, sugestão ou feedback? Estamos aqui para ouvir você!</p>
<section><h2>Email</h2><p>Para questões gerais, parcerias ou suporte: <a href="mailto:contato@vivacripto.com.br">contato@vivacripto.com.br</a></p></section>
<section><h2>Feedback</h2><p>Sua opinião é importante para nós: <a href="mailto:feedback@vivacripto.com.br">feedback@vivacripto.com.br</a></p></section>
<section><h2>Perguntas Frequentes</h2>
<h3>Vocês oferecem consultoria de investimentos?</h3><p>Não. O VivaCripto é um portal puramente informativo.</p>
<h3>Como posso sugerir uma pauta?</h3><p>Envie sua sugestão para nosso email de contato.</p>
<h3>Posso republicar conteúdo do VivaCripto?</h3><p>Entre em contato conosco para discutir parcerias e licenciamento de conteúdo.</p></section>"#,
};

pub const TERMS: InfoPage = InfoPage {
    path: "/termos",
    title: "Termos de Uso",
    description: "Termos de uso do portal VivaCripto.",
    body: r#"<h1>Termos de Uso</h1>
<p class="updated">Última atualização: Janeiro de 2026</p>
<section><h2>1. Aceitação dos Termos</h2><p>Ao acessar e usar o VivaCripto, você concorda com estes Termos de Uso e nossa Política de Privacidade.</p></section>
<section><h2>2. Natureza do Conteúdo</h2><p>O VivaCripto é um portal de notícias <strong>puramente informativo</strong>. Todo o conteúdo publicado:</p><ul><li>É gerado com auxílio de inteligência artificial</li><li>Baseia-se em fontes públicas</li><li>Não constitui conselho financeiro ou de investimento</li></ul></section>
<section><h2>3. Isenção de Responsabilidade</h2><p>O VivaCripto não se responsabiliza por perdas financeiras decorrentes de decisões baseadas em nosso conteúdo, imprecisões no conteúdo publicado ou indisponibilidade temporária do site.</p></section>
<section><h2>4. Uso Aceitável</h2><ul><li>Não copiar ou redistribuir nosso conteúdo sem autorização</li><li>Não usar o site para atividades ilegais</li><li>Não tentar acessar áreas restritas do site</li></ul></section>
<section><h2>5. Propriedade Intelectual</h2><p>Todo o conteúdo do VivaCripto é protegido por direitos autorais.</p></section>
<section><h2>6. Modificações</h2><p>Reservamo-nos o direito de modificar estes Termos de Uso a qualquer momento.</p></section>
<section><h2>7. Contato</h2><p><a href="mailto:contato@vivacripto.com.br">contato@vivacripto.com.br</a></p></section>"#,
};

pub const PRIVACY: InfoPage = InfoPage {
    path: "/privacidade",
    title: "Política de Privacidade",
    description: "Política de privacidade do portal VivaCripto.",
    body: r#"<h1>Política de Privacidade</h1>
<p class="updated">Última atualização: Janeiro de 2026</p>
<section><h2>1. Introdução</h2><p>Esta política explica como coletamos, usamos e protegemos suas informações em conformidade com a Lei Geral de Proteção de Dados (LGPD).</p></section>
<section><h2>2. Dados Coletados</h2><ul><li><strong>Dados de navegação:</strong> endereço IP, tipo de navegador, páginas visitadas</li><li><strong>Newsletter:</strong> email fornecido voluntariamente</li><li><strong>Cookies:</strong> dados técnicos de experiência de uso</li></ul></section>
<section><h2>3. Uso dos Dados</h2><ul><li>Melhorar a experiência de navegação</li><li>Enviar newsletters, apenas para inscritos</li><li>Analisar estatísticas de uso</li><li>Cumprir obrigações legais</li></ul></section>
<section><h2>4. Compartilhamento de Dados</h2><p>Não vendemos nem alugamos seus dados pessoais. Compartilhamos apenas quando exigido por lei, com provedores essenciais (hospedagem, analytics) ou com seu consentimento.</p></section>
<section><h2>5. Cookies</h2><p>Você pode desativar cookies nas configurações do navegador.</p></section>
<section><h2>6. Seus Direitos (LGPD)</h2><p>Você pode acessar, corrigir, excluir ou portar seus dados e revogar consentimento.</p></section>
<section><h2>7. Contato</h2><p><a href="mailto:privacidade@vivacripto.com.br">privacidade@vivacripto.com.br</a></p></section>"#,
};

pub const INFO_PAGES: &[InfoPage] = &[ABOUT, CONTACT, TERMS, PRIVACY];

pub fn render_info_page(state: &AppState, page: &InfoPage) -> String {
    let site = &state.config.site;
    let meta = PageMeta::website(
        site,
        format!("{} - {}", page.title, site.name),
        page.description,
        page.path,
    );
    let body = format!(
        r#"<nav class="breadcrumbs"><a href="/">Início</a> / <span>{}</span></nav><article class="institutional">{}</article>"#,
        html_escape(page.title),
        page.body
    );
    layout(state, &meta, "", &body)
}

fn respond(state: &AppState, page: &InfoPage) -> Response {
    Html(render_info_page(state, page)).into_response()
}

/// GET /sobre
pub async fn about_page(State(state): State<AppState>) -> Response {
    respond(&state, &ABOUT)
}

/// GET /contato
pub async fn contact_page(State(state): State<AppState>) -> Response {
    respond(&state, &CONTACT)
}

/// GET /termos
pub async fn terms_page(State(state): State<AppState>) -> Response {
    respond(&state, &TERMS)
}

/// GET /privacidade
pub async fn privacy_page(State(state): State<AppState>) -> Response {
    respond(&state, &PRIVACY)
}
